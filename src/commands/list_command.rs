//! Listing the band combination registry

use crate::combination::BandCombination;
use crate::errors::BandKitResult;

use super::command_traits::Command;

/// Prints every combination with its (red, green, blue) bands
#[derive(Debug, Default)]
pub struct ListCommand;

impl ListCommand {
    pub fn new() -> Self {
        ListCommand
    }

    /// One line per combination, in declaration order
    pub fn render(&self) -> String {
        let width = BandCombination::ALL.iter()
            .map(|c| c.name().len())
            .max()
            .unwrap_or(0);

        let mut out = String::new();
        for combination in BandCombination::ALL {
            let bands = match combination.bands() {
                Some([red, green, blue]) => format!("R={} G={} B={}", red, green, blue),
                None => "not registered".to_string(),
            };
            out.push_str(&format!("{:<width$}  {}\n", combination.name(), bands, width = width));
        }
        out
    }
}

impl Command for ListCommand {
    fn execute(&self) -> BandKitResult<()> {
        print!("{}", self.render());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_all_seventeen() {
        let listing = ListCommand::new().render();
        let lines: Vec<&str> = listing.lines().collect();

        assert_eq!(lines.len(), 17);
        assert!(lines[0].starts_with("GENERAL_LAND_COVER"));
        assert!(lines[3].starts_with("VEGETATION"));
        assert!(lines[3].ends_with("not registered"));
        assert_eq!(lines.iter().filter(|l| l.ends_with("not registered")).count(), 12);
    }

    #[test]
    fn registered_lines_show_band_numbers() {
        let listing = ListCommand::new().render();
        let water = listing.lines().find(|l| l.starts_with("WATER")).unwrap();
        assert!(water.contains("R=NEAR_INFRARED_2 (8)"), "{}", water);
    }
}
