pub(crate) mod model;
pub(crate) mod options;
pub(crate) mod resolve;
pub(crate) mod sizing;
