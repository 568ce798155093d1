//! A small HTTP server that survives panicking request handlers.
//!
//! Handlers never write to the real response directly. [`Recover`] hands them
//! a [`BufferedResponse`] instead, and only replays it once the handler has
//! returned. If the handler panics, whatever it wrote so far is thrown away and
//! the client receives a `500 Internal Server Error` instead.
//!
//! [`Recover`]: middleware::Recover
//! [`BufferedResponse`]: http::BufferedResponse

/*
 * safety-net - recoverable panics for HTTP handlers.
 *
 * Copyright (C) 2024  AlphaKeks <alphakeks@dawn>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see https://www.gnu.org/licenses.
 */

#[macro_use]
extern crate tracing as _;

#[cfg(test)]
mod testing;

mod signal;

pub mod config;
pub use config::Config;

pub mod fault;
pub mod handler;
pub mod http;
pub mod middleware;
pub mod routes;
pub mod server;
pub use server::{RunError, Server};

pub mod telemetry;
