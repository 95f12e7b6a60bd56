//! Pure domain formulas shared by the HTTP layer: nutrition scoring, unit
//! conversion, day-key arithmetic and goal validation. Nothing in here talks
//! to the database or the network.

pub mod datekey;
pub mod goals;
pub mod score;
pub mod units;
