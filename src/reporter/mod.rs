pub mod json;
pub mod terminal;

use crate::outcome::ScanOutcome;

pub trait Reporter {
    fn report(&self, outcome: &ScanOutcome) -> String;
}
