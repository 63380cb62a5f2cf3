//! The eight phase components. Each takes the open snapshot and the period
//! context and either completes or fails with a [`StructuralError`].

use circ_model::{StructuralError, World};

use crate::context::PeriodContext;
use crate::phase::Phase;

pub mod accumulate;
pub mod constrain;
pub mod demand;
pub mod prices;
pub mod produce;
pub mod revenue;
pub mod supply;
pub mod trade;

/// Run `phase` against `world`. The context's phase must be `phase`.
pub fn run(phase: Phase, world: &mut World, ctx: &mut PeriodContext) -> Result<(), StructuralError> {
    debug_assert_eq!(ctx.phase, phase);
    match phase {
        Phase::Supply => supply::run(world, ctx),
        Phase::Demand => demand::run(world, ctx),
        Phase::Constrain => constrain::run(world, ctx),
        Phase::Trade => trade::run(world, ctx),
        Phase::Produce => produce::run(world, ctx),
        Phase::Revenue => revenue::run(world, ctx),
        Phase::Prices => prices::run(world, ctx),
        Phase::Accumulate => accumulate::run(world, ctx),
    }
}
