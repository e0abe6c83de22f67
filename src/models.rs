use crate::schema::{field_points, loss_history, training_runs};
use chrono::NaiveDateTime;
use diesel::prelude::*;

#[derive(Queryable, Identifiable, Selectable, Debug)]
#[diesel(table_name = training_runs)]
pub struct TrainingRun {
    pub id: i32,
    pub description: String,
    pub epochs: i32,
    pub learning_rate: f64,
    pub cbf_shift: String,
    pub shift_amplitude: f64,
    pub endfeet_coverage: f64,
    pub grid_r_points: i32,
    pub grid_z_points: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = training_runs)]
pub struct NewTrainingRun<'a> {
    pub description: &'a str,
    pub epochs: i32,
    pub learning_rate: f64,
    pub cbf_shift: &'a str,
    pub shift_amplitude: f64,
    pub endfeet_coverage: f64,
    pub grid_r_points: i32,
    pub grid_z_points: i32,
}

#[derive(Insertable)]
#[diesel(table_name = loss_history)]
pub struct NewLossRecord {
    pub run_id: i32,
    pub epoch: i32,
    pub total_loss: f64,
    pub momentum_loss: f64,
    pub continuity_loss: f64,
    pub darcy_loss: f64,
    pub transport_loss: f64,
    pub boundary_loss: f64,
    pub interface_loss: f64,
    pub initial_loss: f64,
}

#[derive(Insertable)]
#[diesel(table_name = field_points)]
pub struct NewFieldPoint {
    pub run_id: i32,
    pub r_index: i32,
    pub z_index: i32,
    pub concentration: f64,
    pub u_r: f64,
    pub u_z: f64,
}
