//! # Data Transfer Objects
//!
//! アプリケーション層で使用するDTO

pub mod analysis_config;
pub mod upload_response;
