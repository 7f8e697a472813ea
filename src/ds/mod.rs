//! Directory-service consensus and sharding control loop.

pub mod gas_price;
pub mod state_machine;
pub mod view_change;

pub use gas_price::{full_block_ratio, next_gas_price, TxBlockGasSample};
pub use state_machine::{admits, assign_shards, DsState, DsStateMachine, Instruction, MicroBlockCollector, PowAdmission};
pub use view_change::ViewChangeController;
