//! Flow solving between an origin province and a hub.
//!
//! Two algorithms are available:
//! - [`FlowAlgorithm::MaxFlow`]: Edmonds-Karp over a network with a super
//!   source feeding each of the origin's mode vertices (capped at that mode's
//!   capacity) and a super sink draining every hub vertex. The solution is
//!   decomposed into paths; each origin mode reports its total and its
//!   largest path as the representative route.
//! - [`FlowAlgorithm::WidestPath`]: a maximum-bottleneck search from each
//!   origin mode vertex separately. Each mode reports its single best route.
//!   Modes may share edges, so the sum can exceed the true maximum flow.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, VecDeque};

use provincia_types::TransportMode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::WorldError;
use crate::graph::TransportGraph;
use crate::route::{Hop, Route};

/// Which solver computes deliverable quantities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowAlgorithm {
    /// True maximum flow with path decomposition.
    #[default]
    MaxFlow,
    /// One maximum-bottleneck route per origin mode.
    WidestPath,
}

/// What one origin mode delivers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeFlow {
    /// The origin mode.
    pub mode: TransportMode,
    /// Quantity leaving the origin in this mode.
    pub quantity: Decimal,
    /// The largest route starting in this mode, if any flow leaves.
    pub route: Option<Route>,
}

/// The solution of one origin-to-hub query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowOutcome {
    /// Total deliverable quantity.
    pub total: Decimal,
    /// Per origin mode, in mode order. Modes without a vertex are absent.
    pub modes: Vec<ModeFlow>,
}

impl FlowOutcome {
    /// Quantity delivered from the origin's `mode` vertex.
    pub fn quantity(&self, mode: TransportMode) -> Decimal {
        self.modes
            .iter()
            .find(|flow| flow.mode == mode)
            .map_or(Decimal::ZERO, |flow| flow.quantity)
    }

    /// The route of the mode carrying the most.
    pub fn best_route(&self) -> Option<&Route> {
        self.modes
            .iter()
            .filter_map(|flow| flow.route.as_ref())
            .max_by(|a, b| a.quantity.cmp(&b.quantity))
    }

    /// Whether nothing reaches the hub.
    pub fn is_unreachable(&self) -> bool {
        self.total <= Decimal::ZERO
    }
}

/// Solve the flow from province `origin` to province `hub` (arena indices).
///
/// An origin equal to the hub, or one without vertices, yields an empty
/// outcome.
///
/// # Errors
///
/// Returns [`WorldError::ArithmeticOverflow`] if flow sums overflow, or a
/// graph index error if the graph is inconsistent.
pub fn solve(
    graph: &TransportGraph,
    origin: usize,
    hub: usize,
    algorithm: FlowAlgorithm,
) -> Result<FlowOutcome, WorldError> {
    if origin == hub {
        return Ok(FlowOutcome::default());
    }
    match algorithm {
        FlowAlgorithm::MaxFlow => max_flow(graph, origin, hub),
        FlowAlgorithm::WidestPath => widest_paths(graph, origin, hub),
    }
}

// ---------------------------------------------------------------------------
// Residual network
// ---------------------------------------------------------------------------

/// A directed arc. Arcs are stored in pairs; arc `i ^ 1` is the reverse of
/// arc `i`, and their flows are kept antisymmetric.
#[derive(Debug, Clone, Copy)]
struct Arc {
    to: usize,
    capacity: Decimal,
    flow: Decimal,
}

impl Arc {
    fn residual(&self) -> Decimal {
        self.capacity.saturating_sub(self.flow)
    }
}

/// A path of the decomposed flow, as network nodes from source to sink.
#[derive(Debug, Clone)]
struct FlowPath {
    nodes: Vec<usize>,
    quantity: Decimal,
}

#[derive(Debug, Clone)]
struct Network {
    arcs: Vec<Arc>,
    adjacency: Vec<Vec<usize>>,
    source: usize,
    sink: usize,
}

impl Network {
    /// Lay the graph out as a network. Graph vertices keep their indices;
    /// the super source and sink take the next two.
    fn from_graph(graph: &TransportGraph, origin: usize, hub: usize) -> Result<Self, WorldError> {
        let source = graph.vertex_count();
        let sink = source.checked_add(1).ok_or(WorldError::ArithmeticOverflow)?;
        let node_count = sink.checked_add(1).ok_or(WorldError::ArithmeticOverflow)?;
        let mut network = Self {
            arcs: Vec::new(),
            adjacency: vec![Vec::new(); node_count],
            source,
            sink,
        };
        for edge in graph.edges() {
            network.add_pair(edge.a, edge.b, edge.capacity, edge.capacity)?;
        }
        for vertex in graph.vertices_of(origin) {
            let capacity = graph.vertex(vertex)?.capacity;
            network.add_pair(source, vertex, capacity, Decimal::ZERO)?;
        }
        for vertex in graph.vertices_of(hub) {
            network.add_pair(vertex, sink, Decimal::MAX, Decimal::ZERO)?;
        }
        Ok(network)
    }

    fn add_pair(
        &mut self,
        from: usize,
        to: usize,
        forward: Decimal,
        backward: Decimal,
    ) -> Result<(), WorldError> {
        let id = self.arcs.len();
        let reverse = id.checked_add(1).ok_or(WorldError::ArithmeticOverflow)?;
        self.adjacency
            .get_mut(from)
            .ok_or(WorldError::VertexOutOfRange(from))?
            .push(id);
        self.adjacency
            .get_mut(to)
            .ok_or(WorldError::VertexOutOfRange(to))?
            .push(reverse);
        self.arcs.push(Arc {
            to,
            capacity: forward,
            flow: Decimal::ZERO,
        });
        self.arcs.push(Arc {
            to: from,
            capacity: backward,
            flow: Decimal::ZERO,
        });
        Ok(())
    }

    fn arc(&self, id: usize) -> Result<&Arc, WorldError> {
        self.arcs.get(id).ok_or(WorldError::ArcOutOfRange(id))
    }

    fn arcs_from(&self, node: usize) -> Result<&[usize], WorldError> {
        self.adjacency
            .get(node)
            .map(Vec::as_slice)
            .ok_or(WorldError::VertexOutOfRange(node))
    }

    /// Tail of an arc: the head of its reverse.
    fn tail(&self, id: usize) -> Result<usize, WorldError> {
        Ok(self.arc(id ^ 1)?.to)
    }

    /// Push `amount` along an arc, keeping the pair antisymmetric.
    fn push(&mut self, id: usize, amount: Decimal) -> Result<(), WorldError> {
        let forward = self.arcs.get_mut(id).ok_or(WorldError::ArcOutOfRange(id))?;
        forward.flow = forward
            .flow
            .checked_add(amount)
            .ok_or(WorldError::ArithmeticOverflow)?;
        let reverse = self
            .arcs
            .get_mut(id ^ 1)
            .ok_or(WorldError::ArcOutOfRange(id ^ 1))?;
        reverse.flow = reverse
            .flow
            .checked_sub(amount)
            .ok_or(WorldError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Breadth-first search for a shortest augmenting path, as arc ids.
    fn augmenting_path(&self) -> Result<Option<Vec<usize>>, WorldError> {
        let mut via: Vec<Option<usize>> = vec![None; self.adjacency.len()];
        let mut seen = vec![false; self.adjacency.len()];
        if let Some(flag) = seen.get_mut(self.source) {
            *flag = true;
        }
        let mut queue = VecDeque::from([self.source]);

        while let Some(node) = queue.pop_front() {
            if node == self.sink {
                break;
            }
            for &id in self.arcs_from(node)? {
                let arc = self.arc(id)?;
                if arc.residual() <= Decimal::ZERO {
                    continue;
                }
                let flag = seen
                    .get_mut(arc.to)
                    .ok_or(WorldError::VertexOutOfRange(arc.to))?;
                if *flag {
                    continue;
                }
                *flag = true;
                if let Some(slot) = via.get_mut(arc.to) {
                    *slot = Some(id);
                }
                queue.push_back(arc.to);
            }
        }

        if !seen.get(self.sink).copied().unwrap_or(false) {
            return Ok(None);
        }
        let mut path = Vec::new();
        let mut node = self.sink;
        while node != self.source {
            let id = via
                .get(node)
                .copied()
                .flatten()
                .ok_or(WorldError::VertexOutOfRange(node))?;
            path.push(id);
            node = self.tail(id)?;
        }
        path.reverse();
        Ok(Some(path))
    }

    /// Augment until no path remains. Returns the total flow.
    fn saturate(&mut self) -> Result<Decimal, WorldError> {
        let mut total = Decimal::ZERO;
        while let Some(path) = self.augmenting_path()? {
            let mut bottleneck = Decimal::MAX;
            for &id in &path {
                bottleneck = bottleneck.min(self.arc(id)?.residual());
            }
            if bottleneck <= Decimal::ZERO {
                break;
            }
            for &id in &path {
                self.push(id, bottleneck)?;
            }
            total = total
                .checked_add(bottleneck)
                .ok_or(WorldError::ArithmeticOverflow)?;
        }
        Ok(total)
    }

    /// Split the flow into source-to-sink paths, cancelling any cycles met
    /// along the way.
    fn decompose(&self) -> Result<Vec<FlowPath>, WorldError> {
        let mut remaining: Vec<Decimal> = self
            .arcs
            .iter()
            .map(|arc| arc.flow.max(Decimal::ZERO))
            .collect();
        let mut paths = Vec::new();

        loop {
            let mut arcs: Vec<usize> = Vec::new();
            // node -> number of arcs walked before reaching it
            let mut position: BTreeMap<usize, usize> = BTreeMap::from([(self.source, 0)]);
            let mut node = self.source;

            while node != self.sink {
                let next = self
                    .arcs_from(node)?
                    .iter()
                    .copied()
                    .find(|id| remaining.get(*id).is_some_and(|left| *left > Decimal::ZERO));
                let Some(id) = next else {
                    if node == self.source {
                        return Ok(paths);
                    }
                    return Err(WorldError::FlowNotConserved { vertex: node });
                };
                let to = self.arc(id)?.to;
                if let Some(&at) = position.get(&to) {
                    let mut cycle = arcs.split_off(at);
                    cycle.push(id);
                    let amount = min_remaining(&remaining, &cycle)?;
                    subtract(&mut remaining, &cycle, amount)?;
                    position.retain(|_, walked| *walked <= at);
                    node = to;
                    continue;
                }
                arcs.push(id);
                position.insert(to, arcs.len());
                node = to;
            }

            let quantity = min_remaining(&remaining, &arcs)?;
            subtract(&mut remaining, &arcs, quantity)?;
            let mut nodes = Vec::with_capacity(arcs.len());
            nodes.push(self.source);
            for &id in &arcs {
                nodes.push(self.arc(id)?.to);
            }
            paths.push(FlowPath { nodes, quantity });
        }
    }
}

fn min_remaining(remaining: &[Decimal], arcs: &[usize]) -> Result<Decimal, WorldError> {
    let mut least = Decimal::MAX;
    for &id in arcs {
        let left = remaining.get(id).ok_or(WorldError::ArcOutOfRange(id))?;
        least = least.min(*left);
    }
    Ok(least)
}

fn subtract(remaining: &mut [Decimal], arcs: &[usize], amount: Decimal) -> Result<(), WorldError> {
    for &id in arcs {
        let left = remaining.get_mut(id).ok_or(WorldError::ArcOutOfRange(id))?;
        *left = left
            .checked_sub(amount)
            .ok_or(WorldError::ArithmeticOverflow)?;
    }
    Ok(())
}

/// Turn graph vertex indices into hops.
fn hops(graph: &TransportGraph, vertices: &[usize]) -> Result<Vec<Hop>, WorldError> {
    vertices
        .iter()
        .map(|index| {
            graph.vertex(*index).map(|vertex| Hop {
                province: vertex.id.clone(),
                mode: vertex.mode,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Maximum flow
// ---------------------------------------------------------------------------

fn max_flow(graph: &TransportGraph, origin: usize, hub: usize) -> Result<FlowOutcome, WorldError> {
    let mut network = Network::from_graph(graph, origin, hub)?;
    let total = network.saturate()?;
    let paths = network.decompose()?;

    let mut modes = Vec::new();
    for &id in network.arcs_from(network.source)? {
        let arc = network.arc(id)?;
        let vertex = graph.vertex(arc.to)?;
        let quantity = arc.flow.max(Decimal::ZERO);
        let largest = paths
            .iter()
            .filter(|path| path.nodes.get(1) == Some(&arc.to))
            .max_by(|a, b| a.quantity.cmp(&b.quantity));
        let route = match largest {
            Some(path) => {
                let inner: Vec<usize> = path
                    .nodes
                    .iter()
                    .copied()
                    .filter(|node| *node != network.source && *node != network.sink)
                    .collect();
                Some(Route {
                    hops: hops(graph, &inner)?,
                    quantity: path.quantity,
                })
            }
            None => None,
        };
        modes.push(ModeFlow {
            mode: vertex.mode,
            quantity,
            route,
        });
    }

    Ok(FlowOutcome { total, modes })
}

// ---------------------------------------------------------------------------
// Widest path
// ---------------------------------------------------------------------------

/// Priority queue entry, ordered so the widest frontier pops first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct State {
    width: Decimal,
    vertex: usize,
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Ties go to the lower vertex index to keep results deterministic.
        self.width
            .cmp(&other.width)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn widest_paths(graph: &TransportGraph, origin: usize, hub: usize) -> Result<FlowOutcome, WorldError> {
    let adjacency = graph.adjacency();
    let mut outcome = FlowOutcome::default();

    for start in graph.vertices_of(origin) {
        let vertex = graph.vertex(start)?;
        let route = widest_route(graph, &adjacency, start, hub)?;
        let quantity = route.as_ref().map_or(Decimal::ZERO, |route| route.quantity);
        outcome.total = outcome
            .total
            .checked_add(quantity)
            .ok_or(WorldError::ArithmeticOverflow)?;
        outcome.modes.push(ModeFlow {
            mode: vertex.mode,
            quantity,
            route,
        });
    }
    Ok(outcome)
}

/// Maximum-bottleneck route from one vertex to any vertex of `hub`.
fn widest_route(
    graph: &TransportGraph,
    adjacency: &[Vec<(usize, Decimal)>],
    start: usize,
    hub: usize,
) -> Result<Option<Route>, WorldError> {
    let initial = graph.vertex(start)?.capacity;
    if initial <= Decimal::ZERO {
        return Ok(None);
    }

    let mut best = vec![Decimal::ZERO; graph.vertex_count()];
    let mut previous: Vec<Option<usize>> = vec![None; graph.vertex_count()];
    let mut done = vec![false; graph.vertex_count()];
    if let Some(width) = best.get_mut(start) {
        *width = initial;
    }
    let mut heap = BinaryHeap::from([State {
        width: initial,
        vertex: start,
    }]);

    while let Some(State { width, vertex }) = heap.pop() {
        let finished = done
            .get_mut(vertex)
            .ok_or(WorldError::VertexOutOfRange(vertex))?;
        if *finished {
            continue;
        }
        *finished = true;

        if graph.vertex(vertex)?.province == hub {
            let mut path = vec![vertex];
            let mut current = vertex;
            while let Some(prior) = previous.get(current).copied().flatten() {
                path.push(prior);
                current = prior;
            }
            path.reverse();
            return Ok(Some(Route {
                hops: hops(graph, &path)?,
                quantity: width,
            }));
        }

        let neighbors = adjacency
            .get(vertex)
            .ok_or(WorldError::VertexOutOfRange(vertex))?;
        for &(next, capacity) in neighbors {
            let through = width.min(capacity);
            let known = best
                .get_mut(next)
                .ok_or(WorldError::VertexOutOfRange(next))?;
            if through > *known {
                *known = through;
                if let Some(slot) = previous.get_mut(next) {
                    *slot = Some(vertex);
                }
                heap.push(State {
                    width: through,
                    vertex: next,
                });
            }
        }
    }
    Ok(None)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;

    use proptest::prelude::*;
    use provincia_types::{CountryName, Province, ProvinceId, Settings, Snapshot};
    use rust_decimal_macros::dec;

    use super::*;
    use crate::repository::Repository;

    fn make_province(id: &str, neighbors: &[&str]) -> Province {
        Province {
            id: ProvinceId::from(id),
            owner: CountryName::from("Avalon"),
            neighbors: neighbors.iter().map(|id| ProvinceId::from(*id)).collect(),
            planet: std::iter::once("Terra".to_owned()).collect(),
            landscapes: std::iter::once("Coast".to_owned()).collect(),
            ..Province::default()
        }
    }

    fn with_capacity(mut province: Province, mode: TransportMode, quantity: Decimal) -> Province {
        province
            .transport_infrastructure
            .link_mut(mode)
            .capacity
            .insert("goods".to_owned(), quantity);
        province
    }

    fn make_graph(provinces: Vec<Province>) -> TransportGraph {
        let (repo, _) = Repository::load(Snapshot {
            provinces,
            settings: Settings {
                transport_modes: TransportMode::ALL.to_vec(),
                resource_categories: vec!["goods".to_owned()],
                coastal_landscapes: vec!["coast".to_owned()],
                ..Settings::default()
            },
            ..Snapshot::default()
        });
        let friendly: BTreeSet<usize> = (0..repo.province_count()).collect();
        TransportGraph::build(&repo, &friendly, "goods").unwrap()
    }

    // -----------------------------------------------------------------------
    // Maximum flow
    // -----------------------------------------------------------------------

    #[test]
    fn single_land_link_delivers_min_capacity() {
        let graph = make_graph(vec![
            with_capacity(make_province("P1", &["P2"]), TransportMode::Land, dec!(10)),
            with_capacity(make_province("P2", &["P1"]), TransportMode::Land, dec!(10)),
        ]);
        let outcome = solve(&graph, 1, 0, FlowAlgorithm::MaxFlow).unwrap();
        assert_eq!(outcome.total, dec!(10));
        assert_eq!(outcome.quantity(TransportMode::Land), dec!(10));
        assert_eq!(outcome.best_route().unwrap().to_string(), "P2(land)->P1(land)");
    }

    #[test]
    fn parallel_modes_add_up() {
        let origin = with_capacity(make_province("P2", &["P1"]), TransportMode::Land, dec!(4));
        let origin = with_capacity(origin, TransportMode::Water, dec!(6));
        let hub = with_capacity(make_province("P1", &["P2"]), TransportMode::Land, dec!(10));
        let hub = with_capacity(hub, TransportMode::Water, dec!(10));
        let graph = make_graph(vec![hub, origin]);
        let outcome = solve(&graph, 1, 0, FlowAlgorithm::MaxFlow).unwrap();
        assert_eq!(outcome.total, dec!(10));
        assert_eq!(outcome.quantity(TransportMode::Land), dec!(4));
        assert_eq!(outcome.quantity(TransportMode::Water), dec!(6));
    }

    #[test]
    fn flow_through_a_relay_is_bottlenecked() {
        let graph = make_graph(vec![
            with_capacity(make_province("P1", &["P2"]), TransportMode::Land, dec!(10)),
            with_capacity(make_province("P2", &["P1", "P3"]), TransportMode::Land, dec!(3)),
            with_capacity(make_province("P3", &["P2"]), TransportMode::Land, dec!(10)),
        ]);
        let outcome = solve(&graph, 2, 0, FlowAlgorithm::MaxFlow).unwrap();
        assert_eq!(outcome.total, dec!(3));
        assert_eq!(
            outcome.best_route().unwrap().to_string(),
            "P3(land)->P2(land)->P1(land)"
        );
    }

    #[test]
    fn transshipment_switches_modes() {
        // P3 reaches P2 by air, P2 reaches P1 only by land.
        let origin = with_capacity(make_province("P3", &[]), TransportMode::Air, dec!(5));
        let relay = with_capacity(make_province("P2", &["P1"]), TransportMode::Air, dec!(8));
        let relay = with_capacity(relay, TransportMode::Land, dec!(8));
        let hub = with_capacity(make_province("P1", &["P2"]), TransportMode::Land, dec!(8));
        let graph = make_graph(vec![hub, relay, origin]);
        let outcome = solve(&graph, 2, 0, FlowAlgorithm::MaxFlow).unwrap();
        assert_eq!(outcome.total, dec!(5));
        assert_eq!(
            outcome.best_route().unwrap().to_string(),
            "P3(air)->P2(air)->P2(land)->P1(land)"
        );
    }

    #[test]
    fn unreachable_origin_yields_zero() {
        let graph = make_graph(vec![
            with_capacity(make_province("P1", &[]), TransportMode::Land, dec!(10)),
            with_capacity(make_province("P2", &[]), TransportMode::Land, dec!(10)),
        ]);
        let outcome = solve(&graph, 1, 0, FlowAlgorithm::MaxFlow).unwrap();
        assert!(outcome.is_unreachable());
        assert_eq!(outcome.quantity(TransportMode::Land), dec!(0));
        assert!(outcome.best_route().is_none());
    }

    #[test]
    fn origin_equal_to_hub_is_empty() {
        let graph = make_graph(vec![with_capacity(
            make_province("P1", &[]),
            TransportMode::Land,
            dec!(10),
        )]);
        let outcome = solve(&graph, 0, 0, FlowAlgorithm::MaxFlow).unwrap();
        assert_eq!(outcome, FlowOutcome::default());
    }

    // -----------------------------------------------------------------------
    // Widest path
    // -----------------------------------------------------------------------

    #[test]
    fn widest_path_prefers_the_wider_detour() {
        // Direct P3-P1 by air is 2 wide; P3-P2-P1 by land is 5 wide.
        let origin = with_capacity(make_province("P3", &["P2"]), TransportMode::Land, dec!(5));
        let origin = with_capacity(origin, TransportMode::Air, dec!(2));
        let relay = with_capacity(make_province("P2", &["P1", "P3"]), TransportMode::Land, dec!(9));
        let hub = with_capacity(make_province("P1", &["P2"]), TransportMode::Land, dec!(9));
        let hub = with_capacity(hub, TransportMode::Air, dec!(9));
        let graph = make_graph(vec![hub, relay, origin]);

        let outcome = solve(&graph, 2, 0, FlowAlgorithm::WidestPath).unwrap();
        assert_eq!(outcome.quantity(TransportMode::Land), dec!(5));
        assert_eq!(outcome.quantity(TransportMode::Air), dec!(2));
        assert_eq!(outcome.total, dec!(7));
        assert_eq!(
            outcome.best_route().unwrap().to_string(),
            "P3(land)->P2(land)->P1(land)"
        );
    }

    #[test]
    fn algorithms_agree_on_a_single_path() {
        let graph = make_graph(vec![
            with_capacity(make_province("P1", &["P2"]), TransportMode::Land, dec!(10)),
            with_capacity(make_province("P2", &["P1"]), TransportMode::Land, dec!(7)),
        ]);
        let max = solve(&graph, 1, 0, FlowAlgorithm::MaxFlow).unwrap();
        let widest = solve(&graph, 1, 0, FlowAlgorithm::WidestPath).unwrap();
        assert_eq!(max.total, widest.total);
        assert_eq!(max.best_route(), widest.best_route());
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    proptest! {
        #[test]
        fn prop_flow_bounded_by_incident_capacity(
            capacities in proptest::collection::vec((0..20i64, 0..20i64, 0..20i64), 2..6),
        ) {
            let count = capacities.len();
            let ids: Vec<String> = (0..count).map(|i| format!("P{i}")).collect();
            let provinces: Vec<Province> = capacities
                .iter()
                .enumerate()
                .map(|(i, (land, water, air))| {
                    // A ring of neighbors, every province on one planet.
                    let neighbors: Vec<&str> = ids
                        .iter()
                        .enumerate()
                        .filter(|(j, _)| i.abs_diff(*j) == 1)
                        .map(|(_, id)| id.as_str())
                        .collect();
                    let province = make_province(ids.get(i).unwrap(), &neighbors);
                    let province = with_capacity(province, TransportMode::Land, Decimal::from(*land));
                    let province = with_capacity(province, TransportMode::Water, Decimal::from(*water));
                    with_capacity(province, TransportMode::Air, Decimal::from(*air))
                })
                .collect();
            let graph = make_graph(provinces);
            for origin in 1..count {
                let outcome = solve(&graph, origin, 0, FlowAlgorithm::MaxFlow).unwrap();
                prop_assert!(outcome.total <= graph.capacity_incident_to(origin));
                let by_mode = outcome
                    .modes
                    .iter()
                    .fold(Decimal::ZERO, |sum, flow| sum.checked_add(flow.quantity).unwrap());
                prop_assert_eq!(by_mode, outcome.total);
                for flow in &outcome.modes {
                    let vertex = graph.vertex(graph.vertex_index(origin, flow.mode).unwrap()).unwrap();
                    prop_assert!(flow.quantity <= vertex.capacity);
                }
            }
        }
    }
}
