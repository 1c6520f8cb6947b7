//! Per-resource transport graph.
//!
//! The graph is an arena of vertices, one per (province, mode) pair that can
//! carry the resource, addressed through a dense slot table indexed by
//! `province_index * MODE_COUNT + mode_index`. Edges are undirected and carry
//! the smaller of their endpoints' capacities; zero-capacity edges are never
//! stored.
//!
//! Edge rules per mode:
//! - vertical: every pair of vertices within one province
//! - `land`: neighbors sharing a planet
//! - `water`: neighbors sharing a planet, each coastal or a sea lane
//! - `air`: any pair sharing a planet
//! - `space`: any pair

use std::collections::{BTreeMap, BTreeSet};

use provincia_types::{Province, ProvinceId, Settings, TransportMode, normalize_tags};
use rust_decimal::Decimal;

use crate::error::WorldError;
use crate::repository::Repository;

/// Number of transport modes, and the stride of the slot table.
pub const MODE_COUNT: usize = TransportMode::ALL.len();

// ---------------------------------------------------------------------------
// Terrain rules
// ---------------------------------------------------------------------------

/// Terrain configuration with every tag case-folded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TerrainRules {
    modes: Vec<TransportMode>,
    permitted: BTreeMap<TransportMode, BTreeSet<String>>,
    coastal: BTreeSet<String>,
    sea_lanes: BTreeSet<String>,
}

impl TerrainRules {
    /// Derive rules from the settings bundle.
    ///
    /// An empty mode list enables every mode.
    pub fn from_settings(settings: &Settings) -> Self {
        let mut modes: Vec<TransportMode> = Vec::new();
        for mode in &settings.transport_modes {
            if !modes.contains(mode) {
                modes.push(*mode);
            }
        }
        if modes.is_empty() {
            modes = TransportMode::ALL.to_vec();
        }
        let permitted = settings
            .permitted_terrain
            .iter()
            .map(|(mode, tags)| (*mode, normalize_tags(tags)))
            .collect();
        Self {
            modes,
            permitted,
            coastal: normalize_tags(&settings.coastal_landscapes),
            sea_lanes: normalize_tags(&settings.sea_routes_landscapes),
        }
    }

    /// Enabled modes in configuration order.
    pub fn modes(&self) -> &[TransportMode] {
        &self.modes
    }

    /// Whether the province's terrain admits `mode`. An empty list admits
    /// everything.
    pub fn permits(&self, province: &Province, mode: TransportMode) -> bool {
        match self.permitted.get(&mode) {
            Some(allowed) if !allowed.is_empty() => province.has_landscape_in(allowed),
            _ => true,
        }
    }

    /// Whether the province carries a coastal landscape.
    pub fn is_coastal(&self, province: &Province) -> bool {
        province.has_landscape_in(&self.coastal)
    }

    /// Whether the province carries a sea-lane landscape.
    pub fn is_sea_lane(&self, province: &Province) -> bool {
        province.has_landscape_in(&self.sea_lanes)
    }

    /// Capacity a province offers to water edges: its own capacity when
    /// coastal, unbounded when it is a sea lane, otherwise nothing.
    pub fn water_reach(&self, province: &Province, capacity: Decimal) -> Decimal {
        if self.is_coastal(province) {
            capacity
        } else if self.is_sea_lane(province) {
            Decimal::MAX
        } else {
            Decimal::ZERO
        }
    }
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

/// One (province, mode) vertex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vertex {
    /// Arena index of the province.
    pub province: usize,
    /// Province id, kept for route rendering.
    pub id: ProvinceId,
    /// Transport mode.
    pub mode: TransportMode,
    /// The province's own capacity in this mode for the resource.
    pub capacity: Decimal,
}

/// An undirected edge between two vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// First endpoint.
    pub a: usize,
    /// Second endpoint.
    pub b: usize,
    /// Most the edge can carry.
    pub capacity: Decimal,
}

impl Edge {
    /// The endpoint opposite `vertex`, if `vertex` is an endpoint.
    pub const fn other(&self, vertex: usize) -> Option<usize> {
        if self.a == vertex {
            Some(self.b)
        } else if self.b == vertex {
            Some(self.a)
        } else {
            None
        }
    }
}

/// The transport graph of one resource over a friendly province set.
#[derive(Debug, Clone, Default)]
pub struct TransportGraph {
    resource: String,
    vertices: Vec<Vertex>,
    slots: Vec<Option<usize>>,
    edges: Vec<Edge>,
}

impl TransportGraph {
    /// Build the graph of `resource` over the provinces in `friendly`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ProvinceIndexOutOfRange`] if `friendly` holds a
    /// stale index, or [`WorldError::ArithmeticOverflow`] if the slot table
    /// cannot be sized.
    pub fn build(
        repo: &Repository,
        friendly: &BTreeSet<usize>,
        resource: &str,
    ) -> Result<Self, WorldError> {
        let rules = TerrainRules::from_settings(repo.settings());
        let slot_count = repo
            .province_count()
            .checked_mul(MODE_COUNT)
            .ok_or(WorldError::ArithmeticOverflow)?;
        let mut graph = Self {
            resource: resource.to_owned(),
            vertices: Vec::new(),
            slots: vec![None; slot_count],
            edges: Vec::new(),
        };

        for &index in friendly {
            let province = repo.province_at(index)?;
            for &mode in rules.modes() {
                let capacity = province.transport_infrastructure.capacity(mode, resource);
                let relays = mode == TransportMode::Water && rules.is_sea_lane(province);
                if (capacity > Decimal::ZERO || relays) && rules.permits(province, mode) {
                    graph.add_vertex(Vertex {
                        province: index,
                        id: province.id.clone(),
                        mode,
                        capacity,
                    })?;
                }
            }
        }

        for &index in friendly {
            let local = graph.vertices_of(index);
            let mut rest = local.as_slice();
            while let Some((&first, tail)) = rest.split_first() {
                for &second in tail {
                    let capacity = graph.vertex(first)?.capacity.min(graph.vertex(second)?.capacity);
                    graph.add_edge(first, second, capacity);
                }
                rest = tail;
            }
        }

        let members: Vec<usize> = friendly.iter().copied().collect();
        let mut rest = members.as_slice();
        while let Some((&first, tail)) = rest.split_first() {
            let here = repo.province_at(first)?;
            for &second in tail {
                let there = repo.province_at(second)?;
                graph.connect(&rules, here, first, there, second)?;
            }
            rest = tail;
        }

        Ok(graph)
    }

    /// Add the horizontal edges between two distinct provinces.
    fn connect(
        &mut self,
        rules: &TerrainRules,
        here: &Province,
        first: usize,
        there: &Province,
        second: usize,
    ) -> Result<(), WorldError> {
        let adjacent = here.neighbors.contains(&there.id) || there.neighbors.contains(&here.id);
        let same_planet = here.shares_planet_with(there);

        for &mode in rules.modes() {
            let (Some(a), Some(b)) = (self.vertex_index(first, mode), self.vertex_index(second, mode))
            else {
                continue;
            };
            let cap_a = self.vertex(a)?.capacity;
            let cap_b = self.vertex(b)?.capacity;
            let capacity = match mode {
                TransportMode::Land if adjacent && same_planet => cap_a.min(cap_b),
                TransportMode::Water if adjacent && same_planet => rules
                    .water_reach(here, cap_a)
                    .min(rules.water_reach(there, cap_b)),
                TransportMode::Air if same_planet => cap_a.min(cap_b),
                TransportMode::Space => cap_a.min(cap_b),
                TransportMode::Land | TransportMode::Water | TransportMode::Air => Decimal::ZERO,
            };
            self.add_edge(a, b, capacity);
        }
        Ok(())
    }

    fn slot(province: usize, mode: TransportMode) -> Option<usize> {
        province
            .checked_mul(MODE_COUNT)
            .and_then(|base| base.checked_add(mode.index()))
    }

    fn add_vertex(&mut self, vertex: Vertex) -> Result<usize, WorldError> {
        let index = self.vertices.len();
        let slot = Self::slot(vertex.province, vertex.mode)
            .and_then(|slot| self.slots.get_mut(slot))
            .ok_or(WorldError::ProvinceIndexOutOfRange(vertex.province))?;
        *slot = Some(index);
        self.vertices.push(vertex);
        Ok(index)
    }

    fn add_edge(&mut self, a: usize, b: usize, capacity: Decimal) {
        if capacity > Decimal::ZERO {
            self.edges.push(Edge { a, b, capacity });
        }
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    /// The resource this graph was built for.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// All vertices in arena order.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// All edges.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// The vertex at an arena index.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::VertexOutOfRange`] for a stale index.
    pub fn vertex(&self, index: usize) -> Result<&Vertex, WorldError> {
        self.vertices
            .get(index)
            .ok_or(WorldError::VertexOutOfRange(index))
    }

    /// Arena index of a province's vertex in `mode`, if present.
    pub fn vertex_index(&self, province: usize, mode: TransportMode) -> Option<usize> {
        Self::slot(province, mode)
            .and_then(|slot| self.slots.get(slot))
            .copied()
            .flatten()
    }

    /// Arena indices of every vertex of a province, in mode order.
    pub fn vertices_of(&self, province: usize) -> Vec<usize> {
        TransportMode::ALL
            .iter()
            .filter_map(|mode| self.vertex_index(province, *mode))
            .collect()
    }

    /// Neighbor lists: for each vertex, `(neighbor, edge capacity)` pairs.
    pub fn adjacency(&self) -> Vec<Vec<(usize, Decimal)>> {
        let mut adjacency = vec![Vec::new(); self.vertices.len()];
        for edge in &self.edges {
            if let Some(list) = adjacency.get_mut(edge.a) {
                list.push((edge.b, edge.capacity));
            }
            if let Some(list) = adjacency.get_mut(edge.b) {
                list.push((edge.a, edge.capacity));
            }
        }
        adjacency
    }

    /// Sum of the capacities of edges touching any vertex of a province.
    ///
    /// Edges inside the province count once. Unbounded edges saturate.
    pub fn capacity_incident_to(&self, province: usize) -> Decimal {
        let local: BTreeSet<usize> = self.vertices_of(province).into_iter().collect();
        self.edges
            .iter()
            .filter(|edge| local.contains(&edge.a) || local.contains(&edge.b))
            .fold(Decimal::ZERO, |sum, edge| sum.saturating_add(edge.capacity))
    }
}
