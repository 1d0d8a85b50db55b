use anyhow::{bail, Context, Result};
use categorical_bayes::{
    accuracy, predict_csv, scores, train, validate_record, Dataset, ModelStore, Record, Value,
};
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "categorical-bayes")]
#[command(about = "Train and query categorical Naive Bayes models")]
#[command(version)]
struct Cli {
    /// Directory holding one JSON document per model
    #[arg(long, env = "BAYES_MODELS_DIR", default_value = "models", global = true)]
    models_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a model from a CSV or JSON dataset (label in the last column)
    Train {
        data: PathBuf,

        /// Name to store the model under (defaults to the file stem)
        #[arg(short, long)]
        name: Option<String>,

        /// Share of rows held out for the accuracy check
        #[arg(long, default_value = "0.3")]
        test_ratio: f64,

        /// Seed for the train/test shuffle
        #[arg(long, default_value = "420")]
        seed: u64,

        /// Replace a stored model with the same name
        #[arg(long)]
        overwrite: bool,
    },

    /// Classify a single record given as feature=value pairs
    Classify {
        name: String,

        #[arg(short = 's', long = "set", value_name = "FEATURE=VALUE", value_parser = parse_pair)]
        values: Vec<(String, Value)>,
    },

    /// Classify every row of a CSV file and write ID,Prediction rows
    Predict {
        name: String,
        input: PathBuf,
        output: PathBuf,
    },

    /// Report a stored model's accuracy on a labeled dataset
    Evaluate { name: String, data: PathBuf },

    /// Print the values each feature of a dataset can take, as JSON
    Schema { data: PathBuf },

    /// List stored models
    List,
}

fn parse_pair(s: &str) -> std::result::Result<(String, Value), String> {
    let (feature, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FEATURE=VALUE, got '{s}'"))?;
    Ok((feature.trim().to_string(), Value::parse(value)))
}

fn load_dataset(path: &Path) -> Result<Dataset> {
    let dataset = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Dataset::from_json_path(path),
        _ => Dataset::from_csv_path(path),
    };
    dataset.with_context(|| format!("failed to load dataset {}", path.display()))
}

fn cmd_train(
    store: &ModelStore,
    data: &Path,
    name: Option<String>,
    test_ratio: f64,
    seed: u64,
    overwrite: bool,
) -> Result<()> {
    let name = match name {
        Some(name) => name,
        None => data
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(str::to_string)
            .context("can't derive a model name from the dataset path, pass --name")?,
    };

    let dataset = load_dataset(data)?;
    let (training, testing) = dataset.split(test_ratio, seed)?;
    info!(
        "split {} rows into {} training and {} test rows",
        dataset.len(),
        training.len(),
        testing.len()
    );

    let model = train(&training, Some(&name))?;

    if !overwrite {
        if let Some(existing) = store.find_identical(&model)? {
            bail!("an identical model is already stored as '{existing}'");
        }
    }
    let path = store.save(&name, &model, overwrite)?;
    println!("Model '{name}' saved to {}", path.display());

    if testing.is_empty() {
        warn!("no rows held out, skipping the accuracy check");
    } else {
        let accuracy = accuracy(&model, &testing)?;
        println!("Accuracy: {:.2}%", accuracy * 100.0);
    }

    Ok(())
}

fn cmd_classify(store: &ModelStore, name: &str, values: Vec<(String, Value)>) -> Result<()> {
    let model = store.load(name)?;
    let record: Record = values.into_iter().collect();

    let report = validate_record(&record, &model);
    for feature in &report.missing_features {
        warn!("no value given for feature '{feature}'");
    }

    let scores = scores(&record, &model)?;
    for (class, score) in &scores {
        println!("{class}: {score:.6}");
    }

    match categorical_bayes::classify(&record, &model)? {
        Some(class) => println!("Predicted class: {class}"),
        None => println!("No results to classify."),
    }

    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let store = ModelStore::new(&cli.models_dir);

    match cli.command {
        Commands::Train {
            data,
            name,
            test_ratio,
            seed,
            overwrite,
        } => cmd_train(&store, &data, name, test_ratio, seed, overwrite)?,
        Commands::Classify { name, values } => cmd_classify(&store, &name, values)?,
        Commands::Predict {
            name,
            input,
            output,
        } => {
            let model = store.load(&name)?;
            let count = predict_csv(&model, &input, &output)
                .with_context(|| format!("failed to predict {}", input.display()))?;
            println!("Wrote {count} predictions to {}", output.display());
        }
        Commands::Evaluate { name, data } => {
            let model = store.load(&name)?;
            let accuracy = accuracy(&model, &load_dataset(&data)?)?;
            println!("Accuracy: {:.2}%", accuracy * 100.0);
        }
        Commands::Schema { data } => {
            let schema = load_dataset(&data)?.schema()?;
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
        Commands::List => {
            let names = store.list()?;
            if names.is_empty() {
                println!("No models stored in {}", store.root().display());
            }
            for name in names {
                println!("{name}");
            }
        }
    }

    Ok(())
}
