mod runner;
pub use runner::{LocalHost, NUM_REDUCERS_KEY, PARTITION_SIZE_KEY};

mod shuffle;
pub use shuffle::group;
