//! Ordered (priority) strategy: the first live endpoint wins.

use crate::selection::LoadBalancer;

#[derive(Debug, Default, Clone, Copy)]
pub struct Ordered;

impl LoadBalancer for Ordered {
    fn next_endpoint(&self, live: &[String]) -> Option<String> {
        live.first().cloned()
    }
}
