mod export;
mod params;
