pub(crate) mod cache;
pub(crate) mod client;

pub(crate) use cache::{Partition, QueryKey};
pub(crate) use client::{QueryClient, QueryState};
