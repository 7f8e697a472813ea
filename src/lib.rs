/* This file is part of shardbft.
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as
 * published by the Free Software Foundation, either version 3 of the
 * License, or (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

//! Gossip dissemination and directory-service consensus core for a
//! sharded BFT chain.
//!
//! The crate is split into the rumor-spreading subsystem ([`gossip`])
//! and the directory-service control loop that drives block production
//! ([`ds`]), with supporting data types ([`block`]), a bloom-filter log
//! index ([`bloom`]), coinbase/Byzantine accounting
//! ([`coinbase`], [`byzantine`]), an in-memory+overflow block store
//! ([`store`]), and the external collaborator contracts this core
//! consumes rather than implements ([`net`], [`rpc`], [`ipc`]).

pub mod block;
pub mod bloom;
pub mod byzantine;
pub mod coinbase;
pub mod config;
pub mod consensus;
pub mod ds;
pub mod error;
pub mod gossip;
pub mod ipc;
pub mod net;
pub mod rpc;
pub mod store;
pub mod util;

pub use error::{Error, Result};
