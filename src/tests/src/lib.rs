// Cross-crate tests for the turn loop and its adapters


#[cfg(test)]
mod config_tests;
#[cfg(test)]
mod turn_loop_tests;
