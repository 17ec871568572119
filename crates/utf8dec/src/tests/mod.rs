
mod equivalence;
mod property_batch;
mod property_roundtrip;
