mod common;

mod calculators;
mod resolver;
