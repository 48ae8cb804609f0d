mod classify;
mod pipeline;
