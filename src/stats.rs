//! # Stats
//!
//! Moment estimators and distributional tests on return samples.

pub mod moments;
pub mod normality;
