use std::path::PathBuf;

use datafusion::prelude::CsvReadOptions;
use figment::providers::Serialized;
use figment::Figment;
use igd_common::config::AppConfig;
use igd_ml::driver::TrainingOutcome;
use igd_store::session::create_session_context;
use igd_store::trainer::StoreTrainer;
use igd_store::working_set::TrainingTarget;
use igd_telemetry::init_telemetry;
use log::info;

use crate::runner::{PassModeArg, StrategyArg};

const SOURCE_TABLE: &str = "source";

pub struct TrainArgs {
    pub path: PathBuf,
    pub label: String,
    pub features: Vec<String>,
    pub learning_rate: Option<f64>,
    pub max_passes: Option<usize>,
    pub strategy: Option<StrategyArg>,
    pub reservoir_size: Option<usize>,
    pub seed: Option<u64>,
    pub pass_mode: Option<PassModeArg>,
}

impl TrainArgs {
    /// Layers the command line flags over the configuration.
    fn apply(&self, figment: Figment) -> Figment {
        let mut figment = figment;
        if let Some(value) = self.learning_rate {
            figment = figment.merge(Serialized::default("training.learning_rate", value));
        }
        if let Some(value) = self.max_passes {
            figment = figment.merge(Serialized::default("training.max_passes", value));
        }
        if let Some(value) = self.strategy {
            let value = match value {
                StrategyArg::FullBatch => "full-batch",
                StrategyArg::Reservoir => "reservoir",
            };
            figment = figment.merge(Serialized::default("training.strategy", value));
        }
        if let Some(value) = self.reservoir_size {
            figment = figment.merge(Serialized::default("training.reservoir_size", value));
        }
        if let Some(value) = self.seed {
            figment = figment.merge(Serialized::default("training.seed", value));
        }
        if let Some(value) = self.pass_mode {
            let value = match value {
                PassModeArg::Aggregate => "aggregate",
                PassModeArg::Cursor => "cursor",
            };
            figment = figment.merge(Serialized::default("store.pass_mode", value));
        }
        figment
    }
}

pub fn run_train(args: TrainArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::extract(args.apply(AppConfig::figment()))?;
    init_telemetry(&config.telemetry)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let outcome = runtime.block_on(train(&config, &args))?;

    println!("passes: {}", outcome.passes);
    for (i, theta) in outcome.theta.iter().enumerate() {
        println!("theta[{i}]: {theta:.6}");
    }
    Ok(())
}

async fn train(
    config: &AppConfig,
    args: &TrainArgs,
) -> Result<TrainingOutcome, Box<dyn std::error::Error>> {
    let ctx = create_session_context(&config.store);
    let path = args.path.to_string_lossy();
    ctx.register_csv(SOURCE_TABLE, path.as_ref(), CsvReadOptions::new())
        .await?;
    info!("registered {} as {SOURCE_TABLE}", args.path.display());
    let target = TrainingTarget::new(SOURCE_TABLE, args.label.clone(), args.features.clone());
    let outcome = StoreTrainer::from_config(ctx, config).train(&target).await?;
    Ok(outcome)
}
