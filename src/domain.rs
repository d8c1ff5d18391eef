//! Named longitude / latitude boxes.
//!
//! Longitudes are degrees east in `[0, 360]`, as on the OISST grid.

use std::{fmt, str::FromStr};

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

impl Domain {
    pub const fn new(lon_min: f64, lon_max: f64, lat_min: f64, lat_max: f64) -> Self {
        Domain {
            lon_min,
            lon_max,
            lat_min,
            lat_max,
        }
    }

    /// Bounds are inclusive.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.lon_min && lon <= self.lon_max && lat >= self.lat_min && lat <= self.lat_max
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}E-{}E, {}N-{}N]",
            self.lon_min, self.lon_max, self.lat_min, self.lat_max
        )
    }
}

pub const GLOBAL: Domain = Domain::new(0.0, 360.0, -90.0, 90.0);
pub const NEW_ZEALAND: Domain = Domain::new(162.0, 180.0, -50.0, -30.0);
pub const TROPICAL_PACIFIC: Domain = Domain::new(140.0, 290.0, -7.0, 7.0);
pub const NINOS: Domain = Domain::new(190.0, 280.0, -10.0, 5.0);
pub const IOD: Domain = Domain::new(45.0, 110.0, -10.0, 10.0);

/// Areas the downloader and `subset` command can cut out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedDomain {
    Global,
    NewZealand,
    TropicalPacific,
    Ninos,
    Iod,
}

impl NamedDomain {
    pub fn domain(self) -> Domain {
        match self {
            NamedDomain::Global => GLOBAL,
            NamedDomain::NewZealand => NEW_ZEALAND,
            NamedDomain::TropicalPacific => TROPICAL_PACIFIC,
            NamedDomain::Ninos => NINOS,
            NamedDomain::Iod => IOD,
        }
    }
}

impl FromStr for NamedDomain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "global" => Ok(NamedDomain::Global),
            "nz" => Ok(NamedDomain::NewZealand),
            "tropical_pacific" => Ok(NamedDomain::TropicalPacific),
            "ninos" => Ok(NamedDomain::Ninos),
            "iod" => Ok(NamedDomain::Iod),
            _ => Err(Error::UnknownName {
                kind: "domain",
                name: s.to_string(),
            }),
        }
    }
}

/// Boxes over which regional SST indices are averaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Nino12,
    Nino3,
    Nino4,
    Nino34,
    Oni,
    IodWest,
    IodEast,
}

impl Region {
    pub const NINOS: [Region; 5] = [
        Region::Nino12,
        Region::Nino3,
        Region::Nino4,
        Region::Nino34,
        Region::Oni,
    ];
    pub const IOD_NODES: [Region; 2] = [Region::IodWest, Region::IodEast];

    pub fn domain(self) -> Domain {
        match self {
            Region::Nino12 => Domain::new(270.0, 280.0, -10.0, 0.0),
            Region::Nino3 => Domain::new(210.0, 270.0, -5.0, 5.0),
            Region::Nino4 => Domain::new(160.0, 210.0, -5.0, 5.0),
            Region::Nino34 | Region::Oni => Domain::new(190.0, 240.0, -5.0, 5.0),
            Region::IodWest => Domain::new(50.0, 70.0, -10.0, 10.0),
            Region::IodEast => Domain::new(90.0, 110.0, -10.0, 0.0),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Region::Nino12 => "1+2",
            Region::Nino3 => "3",
            Region::Nino4 => "4",
            Region::Nino34 => "3.4",
            Region::Oni => "oni",
            Region::IodWest => "IOD_West",
            Region::IodEast => "IOD_East",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Region {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.to_lowercase();
        let key = key.strip_prefix("nino").unwrap_or(&key);

        match key {
            "1+2" | "12" => Ok(Region::Nino12),
            "3" => Ok(Region::Nino3),
            "4" => Ok(Region::Nino4),
            "3.4" | "34" => Ok(Region::Nino34),
            "oni" => Ok(Region::Oni),
            "iod_west" | "iod-west" => Ok(Region::IodWest),
            "iod_east" | "iod-east" => Ok(Region::IodEast),
            _ => Err(Error::UnknownName {
                kind: "region",
                name: s.to_string(),
            }),
        }
    }
}

/// One region or a named group of regions, as accepted by `--region`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionSet(Vec<Region>);

impl RegionSet {
    pub fn regions(&self) -> &[Region] {
        &self.0
    }

    /// Regions of every set in order, each listed once.
    pub fn flatten(sets: &[RegionSet]) -> Vec<Region> {
        let mut regions = Vec::new();
        for region in sets.iter().flat_map(|s| s.regions()) {
            if !regions.contains(region) {
                regions.push(*region);
            }
        }

        regions
    }
}

impl FromStr for RegionSet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "all-ninos" => Ok(RegionSet(Region::NINOS.to_vec())),
            "all-iod" => Ok(RegionSet(Region::IOD_NODES.to_vec())),
            _ => s.parse::<Region>().map(|r| RegionSet(vec![r])),
        }
    }
}

// -- Tests -------------------------------------------------------------------
