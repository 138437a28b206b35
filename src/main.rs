use anyhow::Context;
use clap::Parser;
use neo_etl::core::Sink;
use neo_etl::utils::{logger, validation::Validate};
use neo_etl::{CliArgs, CsvSink, EtlConfig, EtlEngine, NeoPipeline, PostgresSink};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // .env 檔案存在時先載入
    dotenvy::dotenv().ok();
    let args = CliArgs::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting neo-etl");

    // 載入並驗證配置
    let config = match args.load_config().and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };
    if args.verbose {
        tracing::debug!("Resolved config: {:?}", config);
    }

    if args.monitor {
        tracing::info!("🔍 Run monitoring enabled");
    }

    let succeeded = match config.load.csv_output.clone() {
        Some(path) => run(CsvSink::new(path), config, args.monitor).await?,
        None => {
            let db = config.database()?;
            let sink = PostgresSink::connect_lazy(&db.connection_url()?, db.table.clone())
                .context("Failed to create the PostgreSQL connection")?;
            tracing::info!("Engine has been successfully created for {}", sink.describe());
            run(sink, config, args.monitor).await?
        }
    };

    // 結果只記錄於日誌，不轉換為退出碼
    if succeeded {
        println!("✅ ETL process completed successfully!");
    } else {
        eprintln!("❌ ETL process failed, see the logs for details");
    }

    Ok(())
}

async fn run<S: Sink>(sink: S, config: EtlConfig, monitor: bool) -> anyhow::Result<bool> {
    let pipeline = NeoPipeline::new(sink, config).context("Failed to build the pipeline")?;
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor);

    Ok(engine.run().await)
}
