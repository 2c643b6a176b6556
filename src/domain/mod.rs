// Domain layer: layer models, the district gazetteer and ports (interfaces).

pub mod gazetteer;
pub mod model;
pub mod ports;
