mod canvas;
mod interaction;
