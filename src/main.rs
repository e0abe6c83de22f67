use anyhow::Result;
use clap::{Parser, Subcommand};
use tch::{nn, Device};

use nvu_pinn::{
    db, evaluate_grid, validate, visualization, BatchSizes, CbfShift, NvuNet, Parameters, Sampler,
    TrainConfig,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a new model and save the results
    Train {
        #[arg(short, long, default_value = "Baseline")]
        description: String,
        #[arg(short, long, default_value_t = 1000)]
        epochs: usize,
        #[arg(short, long, default_value_t = 1e-3)]
        learning_rate: f64,
        /// CBF perturbation: none, increase or decrease
        #[arg(long, default_value = "none")]
        cbf_shift: String,
        /// CBF shift amplitude, 0 <= a < 1
        #[arg(long, default_value_t = 0.0)]
        amplitude: f64,
        /// Astrocyte end-feet coverage fraction (0.20-0.86)
        #[arg(long, default_value_t = 0.50)]
        coverage: f64,
        /// Evaluation grid resolution (radial x axial)
        #[arg(long, default_value_t = 60)]
        grid_r: usize,
        #[arg(long, default_value_t = 40)]
        grid_z: usize,
    },
    /// List all previous training runs
    List,
    /// Query a past run and regenerate its concentration map
    Query {
        #[arg(short, long)]
        id: i32,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let pool = db::establish_connection_pool()?;

    match &cli.command {
        Commands::Train {
            description,
            epochs,
            learning_rate,
            cbf_shift,
            amplitude,
            coverage,
            grid_r,
            grid_z,
        } => {
            let mut params = Parameters::default();
            params.cbf_shift = CbfShift::parse(cbf_shift)?;
            params.shift_amplitude = *amplitude;
            params.endfeet_coverage = *coverage;
            params.validate()?;

            println!("Starting training run...");
            let run = db::create_training_run(
                &pool,
                description,
                *epochs as i32,
                *learning_rate,
                params.cbf_shift.as_str(),
                params.shift_amplitude,
                params.endfeet_coverage,
                *grid_r as i32,
                *grid_z as i32,
            )?;
            println!("Created training run with ID: {}", run.id);

            let device = Device::cuda_if_available();
            let vs = nn::VarStore::new(device);
            let net = NvuNet::new(&vs.root(), &params);
            let sampler = Sampler::new(&params, BatchSizes::default(), device);
            let cfg = TrainConfig {
                epochs: *epochs,
                learning_rate: *learning_rate,
                ..TrainConfig::default()
            };

            let history = nvu_pinn::train(&vs, &net, &sampler, &params, &cfg)?;
            if let Some(total) = history.final_total() {
                println!("Training finished, final loss {:.6e}", total);
            }

            println!("Saving results to database...");
            db::save_loss_history(&pool, run.id, &history)?;
            let grid = evaluate_grid(&net, &params, *grid_r, *grid_z, device)?;
            db::save_field_grid(&pool, run.id, &grid)?;
            println!("Results saved successfully.");

            let report = validate(&grid, &params);
            println!(
                "Mean blood velocity: {:.3} mm/s (target 0.99-2.03) [{}]",
                report.mean_blood_velocity_mms,
                if report.blood_velocity_ok { "PASS" } else { "FAIL" }
            );
            println!(
                "Mean brain glucose:  {:.3} mM (target 1.03-2.2) [{}]",
                report.mean_brain_concentration_mm,
                if report.brain_concentration_ok { "PASS" } else { "FAIL" }
            );
            println!(
                "Mean ISF speed:      {:.3e} m/s (target ~1e-7) [{}]",
                report.mean_isf_speed_ms,
                if report.isf_speed_ok { "PASS" } else { "FAIL" }
            );

            let map_file = format!("run_{}_concentration.png", run.id);
            visualization::draw_concentration_map(&grid, &map_file)?;
            let loss_file = format!("run_{}_loss.png", run.id);
            visualization::draw_loss_curve(&history, &loss_file)?;
        }
        Commands::List => {
            db::list_training_runs(&pool)?;
        }
        Commands::Query { id } => {
            println!("Querying results for run ID: {}", id);
            let grid = db::get_field_grid(&pool, *id)?;
            println!("Results retrieved. Generating visualization...");

            let output_file = format!("queried_run_{}_concentration.png", id);
            visualization::draw_concentration_map(&grid, &output_file)?;
        }
    }

    Ok(())
}
