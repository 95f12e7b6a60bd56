//! Backend for the avotrack calorie/macro/water/exercise tracker: axum HTTP
//! API over Postgres, JWT auth, S3 progress-photo storage and the pure
//! nutrition-domain formulas (scoring, units, day keys, goal validation).

pub mod app;
pub mod auth;
pub mod autosave;
pub mod config;
pub mod diary;
pub mod domain;
pub mod logs;
pub mod onboarding;
pub mod photos;
pub mod profile;
pub mod state;
pub mod storage;
pub mod summary;
