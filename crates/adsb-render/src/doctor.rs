use anyhow::{anyhow, Result};
use chrono_tz::Tz;

use crate::layout::Layout;
use crate::names::NameRegistry;

pub fn check_cadence(full_refresh_every: u32) -> Result<()> {
    anyhow::ensure!(full_refresh_every >= 1, "display.full_refresh_every must be >= 1");
    anyhow::ensure!(full_refresh_every <= 100, "display.full_refresh_every > 100 will leave heavy ghosting");
    Ok(())
}

pub fn check_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>().map_err(|e| anyhow!("display.timezone {:?}: {}", name, e))
}

pub fn check_layout(layout: &Layout) -> Result<()> {
    anyhow::ensure!(layout.max_cards >= 1, "layout has no room for cards");
    let (_, last) = layout.card_lines(layout.max_cards - 1);
    anyhow::ensure!(last < layout.footer_rule_y, "cards overlap the footer");
    anyhow::ensure!(layout.separator_step >= 1, "separator step must be >= 1");
    Ok(())
}

pub fn check_names(names: &NameRegistry) -> Result<()> {
    anyhow::ensure!(names.types().is_sorted(), "type table not sorted");
    anyhow::ensure!(names.airlines().is_sorted(), "airline table not sorted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cadence_bounds() {
        assert!(check_cadence(15).is_ok());
        assert!(check_cadence(0).is_err());
    }

    #[test]
    fn timezones() {
        assert_eq!(check_timezone("Europe/London").unwrap(), chrono_tz::Europe::London);
        assert!(check_timezone("Mars/Olympus").is_err());
    }

    #[test]
    fn builtin_profiles_pass() {
        check_layout(&Layout::panel_420()).unwrap();
        check_layout(&Layout::panel_750()).unwrap();
        check_names(&NameRegistry::builtin()).unwrap();
    }

    #[test]
    fn overlapping_layout_fails() {
        let l = Layout { max_cards: 9, ..Layout::panel_420() };
        assert!(check_layout(&l).is_err());
    }
}
