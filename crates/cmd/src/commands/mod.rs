// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

pub mod cat;
pub mod list;
pub mod mkdir;
pub mod mv;
pub mod put;
pub mod rm;
pub mod rows;
pub mod stat;

pub use cat::cat_command;
pub use list::list_command;
pub use mkdir::mkdir_command;
pub use mv::mv_command;
pub use put::{put_command, write_at_command};
pub use rm::rm_command;
pub use rows::rows_command;
pub use stat::stat_command;
