mod harness;
mod scenarios;
mod status_priority;
