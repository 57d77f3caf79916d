mod cylinder;
mod shapes;
mod solid_region;
mod sphere;
