//! filing-eps - EPS Extraction Service
//!
//! 決算書HTMLをアップロードしてEPSを抽出し、CSVでダウンロードする

// coverage_nightly cfg が設定されている場合のみ coverage_attribute を有効化
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use anyhow::Result;
use clap::Parser;

use filing_eps::adapter::config::Config;
use filing_eps::driver::{serve, Args};

#[cfg_attr(coverage_nightly, coverage(off))]
#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    // Load configuration
    let mut config = Config::load_or_default(args.config.as_deref())?;
    args.apply(&mut config);

    serve(config).await
}
