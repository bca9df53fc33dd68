pub mod batch;
#[cfg(test)]
pub mod integration_tests;
pub mod locks;
pub mod naming;
pub mod normalize;
