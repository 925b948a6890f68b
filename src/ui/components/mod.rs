// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! MVU components rendered by the application shell.

pub mod record_form;
pub mod search;
pub mod tags;
