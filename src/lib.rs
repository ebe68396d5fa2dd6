// src/lib.rs
//
// Exposto como biblioteca para os testes de integração em tests/.

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
