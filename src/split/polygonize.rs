//! Polygonisierung: beschränkte Flächen eines planaren Arrangements.
//!
//! Klassisches Half-Edge-Tracing: an jedem Knoten werden die Nachbarn nach
//! Winkel sortiert; der Nachfolger einer gerichteten Kante `u→v` ist der
//! zyklische Vorgänger von `u` in der Nachbarliste von `v`. So entstehen
//! Flächen mit dem Inneren links, beschränkte Flächen haben positive Fläche.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::core::Coordinate;
use crate::error::EditError;

use super::noding::{Arrangement, NodeKey};
use super::rings::signed_area;

/// Flächen unterhalb dieser Schwelle gelten als degeneriert.
const AREA_EPSILON: f64 = 1e-9;

/// Flächen einer Zusammenhangskomponente des Arrangements.
#[derive(Debug)]
pub(crate) struct ComponentFaces {
    /// Beschränkte Flächen, CCW orientiert
    pub faces: Vec<Vec<Coordinate>>,
    /// Außenkontur der Komponente, CCW orientiert
    pub outline: Vec<Coordinate>,
}

/// Extrahiert pro Zusammenhangskomponente die beschränkten Flächen und die
/// Außenkontur. Offene Stichkanten (Grad < 2) werden vorab entfernt.
pub(crate) fn extract_components(
    arrangement: &Arrangement,
) -> Result<Vec<ComponentFaces>, EditError> {
    let mut adjacency: HashMap<NodeKey, Vec<NodeKey>> = HashMap::new();
    for (a, b) in &arrangement.edges {
        adjacency.entry(*a).or_default().push(*b);
        adjacency.entry(*b).or_default().push(*a);
    }

    prune_dangling(&mut adjacency);
    if adjacency.is_empty() {
        return Ok(Vec::new());
    }

    // Nachbarn CCW nach Winkel sortieren
    for (node, neighbors) in adjacency.iter_mut() {
        let origin = arrangement.coords[node];
        neighbors.sort_by(|a, b| {
            let da = arrangement.coords[a] - origin;
            let db = arrangement.coords[b] - origin;
            da.y.atan2(da.x).total_cmp(&db.y.atan2(db.x))
        });
    }

    let mut components = Vec::new();
    let mut assigned: HashSet<NodeKey> = HashSet::new();
    let nodes: Vec<NodeKey> = {
        let mut keys: Vec<_> = adjacency.keys().copied().collect();
        keys.sort();
        keys
    };

    for seed in nodes {
        if assigned.contains(&seed) {
            continue;
        }
        let members = flood_fill(seed, &adjacency);
        assigned.extend(members.iter().copied());
        components.push(trace_component(&members, &adjacency, arrangement)?);
    }
    Ok(components)
}

/// Entfernt iterativ Knoten mit Grad < 2 (Stichkanten tragen keine Fläche).
fn prune_dangling(adjacency: &mut HashMap<NodeKey, Vec<NodeKey>>) {
    loop {
        let dangling: Vec<NodeKey> = adjacency
            .iter()
            .filter(|(_, neighbors)| neighbors.len() < 2)
            .map(|(node, _)| *node)
            .collect();
        if dangling.is_empty() {
            return;
        }
        for node in &dangling {
            adjacency.remove(node);
        }
        for neighbors in adjacency.values_mut() {
            neighbors.retain(|n| !dangling.contains(n));
        }
    }
}

fn flood_fill(seed: NodeKey, adjacency: &HashMap<NodeKey, Vec<NodeKey>>) -> HashSet<NodeKey> {
    let mut members = HashSet::new();
    let mut queue = VecDeque::from([seed]);
    members.insert(seed);
    while let Some(node) = queue.pop_front() {
        for neighbor in &adjacency[&node] {
            if members.insert(*neighbor) {
                queue.push_back(*neighbor);
            }
        }
    }
    members
}

fn trace_component(
    members: &HashSet<NodeKey>,
    adjacency: &HashMap<NodeKey, Vec<NodeKey>>,
    arrangement: &Arrangement,
) -> Result<ComponentFaces, EditError> {
    let mut visited: HashSet<(NodeKey, NodeKey)> = HashSet::new();
    let mut faces = Vec::new();
    let mut outline: Option<Vec<Coordinate>> = None;

    let mut starts: Vec<(NodeKey, NodeKey)> = Vec::new();
    for node in members {
        for neighbor in &adjacency[node] {
            starts.push((*node, *neighbor));
        }
    }
    starts.sort();

    for start in starts {
        if visited.contains(&start) {
            continue;
        }
        let mut ring: Vec<Coordinate> = Vec::new();
        let mut current = start;
        loop {
            visited.insert(current);
            let (u, v) = current;
            ring.push(arrangement.coords[&u]);
            let neighbors = &adjacency[&v];
            let position = neighbors.iter().position(|n| *n == u).ok_or_else(|| {
                EditError::InvariantViolation("Asymmetrische Adjazenz im Arrangement".into())
            })?;
            let next = neighbors[(position + neighbors.len() - 1) % neighbors.len()];
            current = (v, next);
            if current == start {
                break;
            }
            // Jede gerichtete Kante gehört zu genau einer Fläche
            if ring.len() > 2 * arrangement.edges.len() {
                return Err(EditError::InvariantViolation(
                    "Flächen-Tracing terminiert nicht".into(),
                ));
            }
        }

        let area = signed_area(&ring);
        if area > AREA_EPSILON {
            faces.push(ring);
        } else if area < -AREA_EPSILON {
            if outline.is_some() {
                return Err(EditError::InvariantViolation(
                    "Mehr als eine Außenfläche in einer Komponente".into(),
                ));
            }
            ring.reverse();
            outline = Some(ring);
        }
        // |Fläche| unter der Schwelle: degenerierter Zyklus, ignorieren
    }

    let outline = outline.ok_or_else(|| {
        EditError::InvariantViolation("Komponente ohne Außenfläche".into())
    })?;
    Ok(ComponentFaces { faces, outline })
}
