// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and hands each subcommand to its
// use case in Layer 2. Prints the final summary; everything
// else is reported through tracing.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{ClassifierArgs, Commands, EvalArgs, EvalClassifierArgs, TrainingArgs};

use crate::application::{
    config::AUTOENCODER_EPOCHS,
    evaluate::EvaluateUseCase,
    train_autoencoder::TrainAutoencoderUseCase,
    train_classifier::TrainClassifierUseCase,
};
use crate::ml::{default_device, evaluator::ClassifierEvaluation, InferBackend, TrainBackend};

#[derive(Parser, Debug)]
#[command(
    name = "cifar-autoencoder",
    version,
    about = "Train a convolutional autoencoder on CIFAR-10, then a classifier on its encoder."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::TrainAutoencoder(args) => run_train_autoencoder(args),
            Commands::TrainClassifier(args)  => run_train_classifier(args),
            Commands::EvalAutoencoder(args)  => run_eval_autoencoder(args),
            Commands::EvalClassifier(args)   => run_eval_classifier(args),
        }
    }
}

fn run_train_autoencoder(args: TrainingArgs) -> Result<()> {
    let config = args.into_config(AUTOENCODER_EPOCHS);
    tracing::info!("Training autoencoder for {} epochs on '{}'", config.epochs, config.data_dir);

    let device = default_device();
    let report = TrainAutoencoderUseCase::new(config).execute::<TrainBackend>(&device)?;

    if let Some(last) = report.epoch_losses.last() {
        println!("Final epoch loss: {last:.6}");
    }
    if let Some(eval) = report.evaluation {
        println!("Test reconstruction MSE: {:.6} ({} images)", eval.mse, eval.samples);
    }
    Ok(())
}

fn run_train_classifier(args: ClassifierArgs) -> Result<()> {
    tracing::info!("Training classifier on encoder from '{}'", args.autoencoder_model_path);

    let device = default_device();
    let report = TrainClassifierUseCase::new(args.into()).execute::<TrainBackend>(&device)?;

    if let Some(last) = report.epoch_losses.last() {
        println!("Final epoch loss: {last:.6}");
    }
    if let Some(eval) = report.evaluation {
        print_classifier_summary(&eval);
    }
    Ok(())
}

fn run_eval_autoencoder(args: EvalArgs) -> Result<()> {
    let device = default_device();
    let eval = EvaluateUseCase::new(args.into()).autoencoder::<InferBackend>(&device)?;
    println!("Test reconstruction MSE: {:.6} ({} images)", eval.mse, eval.samples);
    Ok(())
}

fn run_eval_classifier(args: EvalClassifierArgs) -> Result<()> {
    let device = default_device();
    let eval = EvaluateUseCase::new(args.eval.into())
        .classifier::<InferBackend>(&args.classifier_model_path, &device)?;
    print_classifier_summary(&eval);
    Ok(())
}

fn print_classifier_summary(eval: &ClassifierEvaluation) {
    println!(
        "Test loss: {:.4} | accuracy: {:.2}% ({}/{})",
        eval.loss, eval.accuracy * 100.0, eval.correct, eval.total,
    );
    for tally in &eval.per_class {
        if let Some(acc) = tally.accuracy() {
            println!("  {:<10} {:>6.2}%", tally.class.name(), acc * 100.0);
        }
    }
}
