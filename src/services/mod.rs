pub(crate) mod availability;
pub(crate) mod grades;
pub(crate) mod question_sampler;
pub(crate) mod scoring;
pub(crate) mod statistics;
pub(crate) mod store;
