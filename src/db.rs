use anyhow::Result;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};
use dotenvy::dotenv;
use std::env;

use crate::balancer::LossTerm;
use crate::models::{NewFieldPoint, NewLossRecord, NewTrainingRun, TrainingRun};
use crate::schema::{field_points, loss_history, training_runs};
use crate::training::TrainingHistory;
use crate::validation::FieldGrid;

pub type DbPool = r2d2::Pool<ConnectionManager<PgConnection>>;

pub fn establish_connection_pool() -> Result<DbPool> {
    dotenv().ok();
    let database_url = env::var("DATABASE_URL")?;
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Ok(r2d2::Pool::builder().build(manager)?)
}

#[allow(clippy::too_many_arguments)]
pub fn create_training_run(
    pool: &DbPool,
    desc: &str,
    epochs: i32,
    learning_rate: f64,
    cbf_shift: &str,
    shift_amplitude: f64,
    endfeet_coverage: f64,
    grid_r_points: i32,
    grid_z_points: i32,
) -> Result<TrainingRun> {
    let mut conn = pool.get()?;
    let new_run = NewTrainingRun {
        description: desc,
        epochs,
        learning_rate,
        cbf_shift,
        shift_amplitude,
        endfeet_coverage,
        grid_r_points,
        grid_z_points,
    };

    let run = diesel::insert_into(training_runs::table)
        .values(&new_run)
        .get_result(&mut conn)?;
    Ok(run)
}

pub fn save_loss_history(pool: &DbPool, run_id: i32, history: &TrainingHistory) -> Result<()> {
    let mut conn = pool.get()?;
    let records: Vec<NewLossRecord> = history
        .epochs
        .iter()
        .map(|e| NewLossRecord {
            run_id,
            epoch: e.epoch as i32,
            total_loss: e.total,
            momentum_loss: e.terms[LossTerm::Momentum.index()],
            continuity_loss: e.terms[LossTerm::Continuity.index()],
            darcy_loss: e.terms[LossTerm::Darcy.index()],
            transport_loss: e.terms[LossTerm::Transport.index()],
            boundary_loss: e.terms[LossTerm::Boundary.index()],
            interface_loss: e.terms[LossTerm::Interface.index()],
            initial_loss: e.terms[LossTerm::Initial.index()],
        })
        .collect();

    // bulk insert, chunked to stay within the Postgres bind limit
    for chunk in records.chunks(1000) {
        diesel::insert_into(loss_history::table)
            .values(chunk)
            .execute(&mut conn)?;
    }
    Ok(())
}

pub fn save_field_grid(pool: &DbPool, run_id: i32, grid: &FieldGrid) -> Result<()> {
    let mut conn = pool.get()?;
    let mut new_points = Vec::with_capacity(grid.n_r * grid.n_z);

    for i in 0..grid.n_r {
        for j in 0..grid.n_z {
            new_points.push(NewFieldPoint {
                run_id,
                r_index: i as i32,
                z_index: j as i32,
                concentration: grid.concentration[[i, j]],
                u_r: grid.u_r[[i, j]],
                u_z: grid.u_z[[i, j]],
            });
        }
    }

    for chunk in new_points.chunks(1000) {
        diesel::insert_into(field_points::table)
            .values(chunk)
            .execute(&mut conn)?;
    }
    Ok(())
}

pub fn list_training_runs(pool: &DbPool) -> Result<()> {
    use crate::schema::training_runs::dsl::*;
    let mut conn = pool.get()?;
    let runs = training_runs.load::<TrainingRun>(&mut conn)?;

    println!("--- Available Training Runs ---");
    println!(
        "{:<5} | {:<25} | {:<8} | {:<10} | {:<10} | {:<8} | {:<8}",
        "ID", "Description", "Epochs", "LR", "Shift", "Ampl", "Coverage"
    );
    println!("{}", "-".repeat(92));
    for run in runs {
        println!(
            "{:<5} | {:<25} | {:<8} | {:<10.1e} | {:<10} | {:<8.2} | {:<8.2}",
            run.id,
            run.description,
            run.epochs,
            run.learning_rate,
            run.cbf_shift,
            run.shift_amplitude,
            run.endfeet_coverage
        );
    }
    Ok(())
}

pub fn get_field_grid(pool: &DbPool, run_id_to_get: i32) -> Result<FieldGrid> {
    use crate::schema::field_points::dsl::*;
    use crate::schema::training_runs::dsl::{grid_r_points, grid_z_points, training_runs};

    let mut conn = pool.get()?;

    let (n_r, n_z) = training_runs
        .find(run_id_to_get)
        .select((grid_r_points, grid_z_points))
        .first::<(i32, i32)>(&mut conn)?;

    let mut grid = FieldGrid::zeros(n_r as usize, n_z as usize);

    let points = field_points
        .filter(run_id.eq(run_id_to_get))
        .load::<(i64, i32, i32, i32, f64, f64, f64)>(&mut conn)?;

    for (_id, _run_id, i, j, c, ur, uz) in points {
        if i < n_r && j < n_z {
            grid.concentration[[i as usize, j as usize]] = c;
            grid.u_r[[i as usize, j as usize]] = ur;
            grid.u_z[[i as usize, j as usize]] = uz;
        }
    }

    Ok(grid)
}
