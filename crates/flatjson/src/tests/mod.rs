
mod lookup;
mod reload;
