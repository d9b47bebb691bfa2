mod calculator;
mod common;
mod resolver;
