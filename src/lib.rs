//! # adr-analytics
//!
//! Risk/return analytics for a basket of equity price series and a benchmark:
//! summary statistics, CAPM regressions, normality diagnostics and a Monte
//! Carlo efficient frontier.
//!
//! Every operation is a pure function of its inputs. Price data comes from the
//! caller; nothing here performs I/O or caches between requests.
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`series`] | Price and return series, common-date alignment |
//! | [`metrics`] | Annualized return/volatility, Sharpe, VaR, drawdown |
//! | [`capm`] | Beta, alpha and R² against a benchmark |
//! | [`stats`] | Moments, Jarque-Bera, Shapiro-Wilk, histogram fit |
//! | [`frontier`] | Monte Carlo portfolios and the efficient set |
//! | [`engine`] | Whole-request pipeline |

pub mod capm;
pub mod config;
pub mod engine;
pub mod error;
pub mod frontier;
pub mod metrics;
pub mod portfolio;
pub mod series;
pub mod stats;

pub use capm::compute_capm;
pub use capm::CapmResult;
pub use capm::RiskFree;
pub use config::AnalyticsConfig;
pub use config::VarConfig;
pub use config::VarMethod;
pub use engine::AnalysisReport;
pub use engine::AnalysisRequest;
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use error::Result;
pub use frontier::simulate_frontier;
pub use frontier::FrontierConfig;
pub use frontier::FrontierPoint;
pub use frontier::FrontierResult;
pub use frontier::SamplingLaw;
pub use metrics::compute_asset_statistics;
pub use metrics::AssetStatistics;
pub use portfolio::Portfolio;
pub use series::build_return_series;
pub use series::PriceSeries;
pub use series::ReturnSeries;
pub use stats::normality::histogram_fit;
pub use stats::normality::test_normality;
pub use stats::normality::NormalityResult;
