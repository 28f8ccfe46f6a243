mod analysis_flow;
mod properties;
