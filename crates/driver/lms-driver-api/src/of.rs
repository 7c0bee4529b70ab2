//! In-memory device description tree.
//!
//! Drivers read their topology from a [`DeviceTree`]: a rooted tree of named
//! nodes, each carrying properties whose values are stored the way a
//! flattened device tree stores them (big-endian 32-bit cells, NUL-terminated
//! strings). Nodes may carry a `phandle` so that other nodes can reference
//! them from phandle lists such as `in-uarts = <&uart0 &uart1>`.
//!
//! The tree is built with the `add_node` / `set_*` methods and read through
//! [`DeviceNode`] views, which provide the typed accessors drivers use.

use alloc::string::String;
use alloc::vec::Vec;
use alloc::collections::BTreeMap;
use core::fmt;

use crate::resource::MemRange;

/// Default `#address-cells` when the parent does not specify one.
const DEFAULT_ADDRESS_CELLS: u32 = 2;
/// Default `#size-cells` when the parent does not specify one.
const DEFAULT_SIZE_CELLS: u32 = 1;

/// Errors returned by device description lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfError {
    /// The property (or the requested entry within it) does not exist.
    NotFound,
    /// The property exists but its value has the wrong shape.
    InvalidFormat,
    /// A phandle list references a node that does not exist.
    DanglingPhandle,
    /// The property holds fewer values than requested.
    Overflow,
}

impl fmt::Display for OfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => f.write_str("property not found"),
            Self::InvalidFormat => f.write_str("invalid property format"),
            Self::DanglingPhandle => f.write_str("dangling phandle"),
            Self::Overflow => f.write_str("property too short"),
        }
    }
}

impl core::error::Error for OfError {}

impl From<OfError> for crate::DriverError {
    fn from(_: OfError) -> Self {
        Self::ConfigMismatch
    }
}

/// Index of a node inside its [`DeviceTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct NodeId(usize);

/// A single property: a name and its raw value bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    name: String,
    data: Vec<u8>,
}

impl Property {
    /// Returns the property name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the raw property data.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the length of the property data in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the property data is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Interprets the property as a big-endian `u32`.
    #[must_use]
    pub fn as_u32(&self) -> Option<u32> {
        let bytes: [u8; 4] = self.data.get(..4)?.try_into().ok()?;
        Some(u32::from_be_bytes(bytes))
    }

    /// Returns the number of 32-bit cells, or `None` if the length is not a
    /// multiple of four.
    #[must_use]
    pub fn cell_count(&self) -> Option<usize> {
        (self.data.len() % 4 == 0).then_some(self.data.len() / 4)
    }

    /// Returns an iterator over the big-endian 32-bit cells.
    ///
    /// Trailing bytes that do not form a whole cell are ignored.
    pub fn cells(&self) -> impl Iterator<Item = u32> + '_ {
        self.data
            .chunks_exact(4)
            .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]))
    }

    /// Interprets the property as a NUL-terminated UTF-8 string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        let bytes = match self.data.split_last() {
            Some((0, rest)) => rest,
            _ => &self.data,
        };
        core::str::from_utf8(bytes).ok()
    }

    /// Returns an iterator over a NUL-separated string list.
    pub fn as_str_list(&self) -> impl Iterator<Item = &str> + '_ {
        self.data
            .split(|&b| b == 0)
            .filter(|s| !s.is_empty())
            .filter_map(|s| core::str::from_utf8(s).ok())
    }
}

#[derive(Debug, Clone)]
struct Node {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    props: Vec<Property>,
}

/// A device description tree.
#[derive(Debug, Clone)]
pub struct DeviceTree {
    nodes: Vec<Node>,
    phandles: BTreeMap<u32, NodeId>,
}

impl Default for DeviceTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceTree {
    /// Creates a tree containing only an unnamed root node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: alloc::vec![Node {
                name: String::new(),
                parent: None,
                children: Vec::new(),
                props: Vec::new(),
            }],
            phandles: BTreeMap::new(),
        }
    }

    /// Returns the id of the root node.
    #[must_use]
    pub const fn root_id(&self) -> NodeId {
        NodeId(0)
    }

    /// Returns a read view of the root node.
    #[must_use]
    pub fn root(&self) -> DeviceNode<'_> {
        self.node(self.root_id())
    }

    /// Returns a read view of `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this tree.
    #[must_use]
    pub fn node(&self, id: NodeId) -> DeviceNode<'_> {
        assert!(id.0 < self.nodes.len(), "node id from another tree");
        DeviceNode { tree: self, id }
    }

    /// Finds a node by its full path (e.g. `"/soc/serial@1d0c000"`).
    #[must_use]
    pub fn find_node(&self, path: &str) -> Option<DeviceNode<'_>> {
        let mut current = self.root();
        for component in path.split('/').filter(|c| !c.is_empty()) {
            current = current.find_child(component)?;
        }
        Some(current)
    }

    /// Resolves a phandle to the node that declared it.
    #[must_use]
    pub fn node_by_phandle(&self, phandle: u32) -> Option<DeviceNode<'_>> {
        self.phandles.get(&phandle).map(|&id| self.node(id))
    }

    /// Adds a child node named `name` under `parent` and returns its id.
    pub fn add_node(&mut self, parent: NodeId, name: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: String::from(name),
            parent: Some(parent),
            children: Vec::new(),
            props: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Sets (or replaces) a property with raw bytes.
    pub fn set_property(&mut self, node: NodeId, name: &str, data: Vec<u8>) {
        let props = &mut self.nodes[node.0].props;
        if let Some(prop) = props.iter_mut().find(|p| p.name == name) {
            prop.data = data;
        } else {
            props.push(Property {
                name: String::from(name),
                data,
            });
        }
    }

    /// Removes a property. Returns `true` if it existed.
    pub fn remove_property(&mut self, node: NodeId, name: &str) -> bool {
        let props = &mut self.nodes[node.0].props;
        let before = props.len();
        props.retain(|p| p.name != name);
        props.len() != before
    }

    /// Sets a single-cell property.
    pub fn set_u32(&mut self, node: NodeId, name: &str, value: u32) {
        self.set_u32s(node, name, &[value]);
    }

    /// Sets a property holding a list of cells.
    pub fn set_u32s(&mut self, node: NodeId, name: &str, values: &[u32]) {
        let data = values.iter().flat_map(|v| v.to_be_bytes()).collect();
        self.set_property(node, name, data);
    }

    /// Sets a string property.
    pub fn set_str(&mut self, node: NodeId, name: &str, value: &str) {
        self.set_strs(node, name, &[value]);
    }

    /// Sets a string-list property.
    pub fn set_strs(&mut self, node: NodeId, name: &str, values: &[&str]) {
        let mut data = Vec::new();
        for value in values {
            data.extend_from_slice(value.as_bytes());
            data.push(0);
        }
        self.set_property(node, name, data);
    }

    /// Assigns `phandle` to `node` so phandle lists can reference it.
    pub fn set_phandle(&mut self, node: NodeId, phandle: u32) {
        self.set_u32(node, "phandle", phandle);
        self.phandles.insert(phandle, node);
    }
}

/// A resolved entry of a phandle list: the target node plus its arguments.
#[derive(Debug, Clone)]
pub struct PhandleArgs<'a> {
    /// The referenced node.
    pub node: DeviceNode<'a>,
    /// The argument cells following the phandle.
    pub args: Vec<u32>,
}

/// A read-only view of one node in a [`DeviceTree`].
#[derive(Clone, Copy)]
pub struct DeviceNode<'a> {
    tree: &'a DeviceTree,
    id: NodeId,
}

impl fmt::Debug for DeviceNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DeviceNode").field(&self.full_path()).finish()
    }
}

impl fmt::Display for DeviceNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_path())
    }
}

impl PartialEq for DeviceNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for DeviceNode<'_> {}

impl<'a> DeviceNode<'a> {
    fn raw(&self) -> &'a Node {
        &self.tree.nodes[self.id.0]
    }

    /// Returns the node's id.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns the tree this node belongs to.
    #[must_use]
    pub fn tree(&self) -> &'a DeviceTree {
        self.tree
    }

    /// Returns the node name (empty for the root).
    #[must_use]
    pub fn name(&self) -> &'a str {
        &self.raw().name
    }

    /// Returns the parent node, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<DeviceNode<'a>> {
        self.raw().parent.map(|id| self.tree.node(id))
    }

    /// Returns an iterator over the node's children.
    pub fn children(&self) -> impl Iterator<Item = DeviceNode<'a>> + 'a {
        let tree = self.tree;
        self.raw().children.iter().map(move |&id| tree.node(id))
    }

    /// Finds a direct child by name.
    #[must_use]
    pub fn find_child(&self, name: &str) -> Option<DeviceNode<'a>> {
        self.children().find(|c| c.name() == name)
    }

    /// Returns the full path of this node (`"/"` for the root).
    #[must_use]
    pub fn full_path(&self) -> String {
        let mut parts = Vec::new();
        let mut current = Some(*self);
        while let Some(node) = current {
            if node.parent().is_some() {
                parts.push(node.name());
            }
            current = node.parent();
        }
        if parts.is_empty() {
            return String::from("/");
        }
        let mut path = String::new();
        for part in parts.iter().rev() {
            path.push('/');
            path.push_str(part);
        }
        path
    }

    /// Returns an iterator over the node's properties.
    pub fn properties(&self) -> impl Iterator<Item = &'a Property> + 'a {
        self.raw().props.iter()
    }

    /// Looks up a property by name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&'a Property> {
        self.raw().props.iter().find(|p| p.name == name)
    }

    /// Reads a single-cell property.
    ///
    /// # Errors
    ///
    /// [`OfError::NotFound`] if absent, [`OfError::InvalidFormat`] if shorter
    /// than one cell.
    pub fn read_u32(&self, name: &str) -> Result<u32, OfError> {
        self.property(name)
            .ok_or(OfError::NotFound)?
            .as_u32()
            .ok_or(OfError::InvalidFormat)
    }

    /// Counts the 32-bit cells in a property.
    ///
    /// # Errors
    ///
    /// [`OfError::NotFound`] if absent, [`OfError::InvalidFormat`] if the
    /// length is not a whole number of cells.
    pub fn count_u32_elems(&self, name: &str) -> Result<usize, OfError> {
        self.property(name)
            .ok_or(OfError::NotFound)?
            .cell_count()
            .ok_or(OfError::InvalidFormat)
    }

    /// Fills `out` with the first `out.len()` cells of a property.
    ///
    /// Extra cells beyond `out.len()` are ignored; callers that need an exact
    /// length check it with [`count_u32_elems`](Self::count_u32_elems).
    ///
    /// # Errors
    ///
    /// [`OfError::NotFound`] if absent, [`OfError::Overflow`] if it holds
    /// fewer than `out.len()` cells.
    pub fn read_u32_array(&self, name: &str, out: &mut [u32]) -> Result<(), OfError> {
        let prop = self.property(name).ok_or(OfError::NotFound)?;
        if prop.len() / 4 < out.len() {
            return Err(OfError::Overflow);
        }
        for (slot, cell) in out.iter_mut().zip(prop.cells()) {
            *slot = cell;
        }
        Ok(())
    }

    /// Counts the strings in a string-list property.
    ///
    /// # Errors
    ///
    /// [`OfError::NotFound`] if absent.
    pub fn count_strings(&self, name: &str) -> Result<usize, OfError> {
        Ok(self
            .property(name)
            .ok_or(OfError::NotFound)?
            .as_str_list()
            .count())
    }

    /// Returns the index of `value` within a string-list property.
    ///
    /// # Errors
    ///
    /// [`OfError::NotFound`] if the property is absent or does not contain
    /// `value`.
    pub fn match_string(&self, name: &str, value: &str) -> Result<usize, OfError> {
        self.property(name)
            .ok_or(OfError::NotFound)?
            .as_str_list()
            .position(|s| s == value)
            .ok_or(OfError::NotFound)
    }

    /// Returns `true` if `compat` appears in the node's `compatible` list.
    #[must_use]
    pub fn is_compatible(&self, compat: &str) -> bool {
        self.match_string("compatible", compat).is_ok()
    }

    /// Walks a phandle list, calling `visit` with each entry's index, target
    /// and argument cells. Stops early when `visit` returns `true`.
    fn walk_phandles(
        &self,
        list: &str,
        cells_name: &str,
        mut visit: impl FnMut(usize, Option<DeviceNode<'a>>, &[u32]) -> bool,
    ) -> Result<usize, OfError> {
        let prop = self.property(list).ok_or(OfError::NotFound)?;
        let cells: Vec<u32> = prop.cells().collect();
        let mut cursor = 0;
        let mut index = 0;
        while cursor < cells.len() {
            let phandle = cells[cursor];
            cursor += 1;

            // A zero phandle is an empty entry with no arguments.
            let (target, count) = if phandle == 0 {
                (None, 0)
            } else {
                let target = self
                    .tree
                    .node_by_phandle(phandle)
                    .ok_or(OfError::DanglingPhandle)?;
                let count = target
                    .read_u32(cells_name)
                    .map_err(|_| OfError::InvalidFormat)? as usize;
                (Some(target), count)
            };

            let end = cursor + count;
            if end > cells.len() {
                return Err(OfError::InvalidFormat);
            }
            if visit(index, target, &cells[cursor..end]) {
                return Ok(index + 1);
            }
            cursor = end;
            index += 1;
        }
        Ok(index)
    }

    /// Counts the entries of a phandle list whose targets declare their
    /// argument count in `cells_name` (e.g. `#uart-cells`).
    ///
    /// # Errors
    ///
    /// [`OfError::NotFound`] if the list is absent, [`OfError::DanglingPhandle`]
    /// or [`OfError::InvalidFormat`] if an entry cannot be decoded.
    pub fn count_phandle_with_args(&self, list: &str, cells_name: &str) -> Result<usize, OfError> {
        self.walk_phandles(list, cells_name, |_, _, _| false)
    }

    /// Resolves the `index`-th entry of a phandle list.
    ///
    /// # Errors
    ///
    /// [`OfError::NotFound`] if the list is absent, shorter than `index + 1`
    /// entries, or the entry is empty; decoding errors as for
    /// [`count_phandle_with_args`](Self::count_phandle_with_args).
    pub fn parse_phandle_with_args(
        &self,
        list: &str,
        cells_name: &str,
        index: usize,
    ) -> Result<PhandleArgs<'a>, OfError> {
        let mut found = None;
        self.walk_phandles(list, cells_name, |i, target, args| {
            if i == index {
                found = Some(target.map(|node| PhandleArgs {
                    node,
                    args: args.to_vec(),
                }));
                true
            } else {
                false
            }
        })?;
        found.flatten().ok_or(OfError::NotFound)
    }

    /// Translates the `index`-th `reg` entry into a memory range using the
    /// parent's `#address-cells` and `#size-cells`.
    ///
    /// # Errors
    ///
    /// [`OfError::NotFound`] if there is no such entry, [`OfError::InvalidFormat`]
    /// if the cell counts are unsupported.
    pub fn address_to_resource(&self, index: usize) -> Result<MemRange, OfError> {
        let (addr_cells, size_cells) = match self.parent() {
            Some(parent) => (
                parent
                    .read_u32("#address-cells")
                    .unwrap_or(DEFAULT_ADDRESS_CELLS),
                parent.read_u32("#size-cells").unwrap_or(DEFAULT_SIZE_CELLS),
            ),
            None => (DEFAULT_ADDRESS_CELLS, DEFAULT_SIZE_CELLS),
        };
        if addr_cells == 0 || addr_cells > 2 || size_cells > 2 {
            return Err(OfError::InvalidFormat);
        }

        let reg: Vec<u32> = self.property("reg").ok_or(OfError::NotFound)?.cells().collect();
        let width = (addr_cells + size_cells) as usize;
        let entry = reg
            .chunks_exact(width)
            .nth(index)
            .ok_or(OfError::NotFound)?;

        let fold = |cells: &[u32]| {
            cells
                .iter()
                .fold(0u64, |acc, &c| (acc << 32) | u64::from(c))
        };
        let (addr, size) = entry.split_at(addr_cells as usize);
        Ok(MemRange::new(fold(addr), fold(size)))
    }
}
