//! Container layer tests

mod writer_tests;
