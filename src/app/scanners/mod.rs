pub mod trial_division;

pub use trial_division::TrialDivisionScanner;
