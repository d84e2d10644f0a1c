mod arbitrary;
mod snapshot_events;
