//! Collision layers: named groups of bodies with a symmetric table
//! deciding which groups are tested against each other at all.

use thiserror::Error;

/// Layers are indexed from 0 to 24.
pub const MAX_LAYERS: usize = 25;

/// Error raised on references to undefined layers or invalid layer setup.
#[derive(Debug, Error)]
pub enum LayerError {
    #[error("layers are indexed from 0 to {}, got {0}", MAX_LAYERS - 1)]
    IndexOutOfRange(usize),
    #[error("layer {0} exists already")]
    AlreadyExists(usize),
    #[error("layer {0} is undefined")]
    UndefinedIndex(usize),
    #[error("layer \"{0}\" is undefined")]
    UndefinedName(String),
}

/// A reference to a layer by index or by name.
#[derive(Clone, Copy, Debug)]
pub enum LayerRef<'a> {
    Index(usize),
    Name(&'a str),
}

impl From<usize> for LayerRef<'static> {
    fn from(index: usize) -> Self {
        LayerRef::Index(index)
    }
}

impl<'a> From<&'a str> for LayerRef<'a> {
    fn from(name: &'a str) -> Self {
        LayerRef::Name(name)
    }
}

#[derive(Clone, Debug)]
struct Layer {
    name: String,
    interactions: [bool; MAX_LAYERS],
}

/// The symmetric layer interaction table owned by a physics world.
///
/// Layer 0 is pre-registered as "default" and interacts with itself.
/// Layers are added once at setup and never removed.
#[derive(Clone, Debug)]
pub struct LayerMatrix {
    layers: [Option<Layer>; MAX_LAYERS],
}

impl Default for LayerMatrix {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerMatrix {
    pub fn new() -> Self {
        let mut layers: [Option<Layer>; MAX_LAYERS] = std::array::from_fn(|_| None);
        let mut default = Layer {
            name: "default".to_string(),
            interactions: [false; MAX_LAYERS],
        };
        default.interactions[0] = true;
        layers[0] = Some(default);
        LayerMatrix { layers }
    }

    /// Register a new layer, initializing its interaction with every
    /// existing layer (in both directions) to `default_interaction`.
    ///
    /// Fails if the index is out of range or already occupied.
    pub fn add_layer(
        &mut self,
        index: usize,
        name: impl Into<String>,
        default_interaction: bool,
    ) -> Result<(), LayerError> {
        if index >= MAX_LAYERS {
            return Err(LayerError::IndexOutOfRange(index));
        }
        if self.layers[index].is_some() {
            return Err(LayerError::AlreadyExists(index));
        }

        let mut layer = Layer {
            name: name.into(),
            interactions: [false; MAX_LAYERS],
        };
        for (other_index, other) in self.layers.iter_mut().enumerate() {
            if let Some(other) = other {
                layer.interactions[other_index] = default_interaction;
                other.interactions[index] = default_interaction;
            }
        }
        layer.interactions[index] = default_interaction;
        self.layers[index] = Some(layer);
        Ok(())
    }

    /// Set whether two layers interact. Storage is symmetric:
    /// setting (a, b) also sets (b, a).
    pub fn set_interaction<'a, 'b>(
        &mut self,
        a: impl Into<LayerRef<'a>>,
        b: impl Into<LayerRef<'b>>,
        allowed: bool,
    ) -> Result<(), LayerError> {
        let a = self.resolve(a.into())?;
        let b = self.resolve(b.into())?;
        // both indices were just resolved against occupied slots
        self.layers[a].as_mut().unwrap().interactions[b] = allowed;
        self.layers[b].as_mut().unwrap().interactions[a] = allowed;
        Ok(())
    }

    /// Whether two layers interact.
    pub fn get_interaction<'a, 'b>(
        &self,
        a: impl Into<LayerRef<'a>>,
        b: impl Into<LayerRef<'b>>,
    ) -> Result<bool, LayerError> {
        let a = self.resolve(a.into())?;
        let b = self.resolve(b.into())?;
        Ok(self.layers[a].as_ref().unwrap().interactions[b])
    }

    /// Whether a layer has been registered.
    pub fn layer_exists<'a>(&self, layer: impl Into<LayerRef<'a>>) -> bool {
        self.resolve(layer.into()).is_ok()
    }

    /// The name of a registered layer.
    pub fn name(&self, index: usize) -> Option<&str> {
        self.layers
            .get(index)
            .and_then(|l| l.as_ref())
            .map(|l| l.name.as_str())
    }

    /// Interaction lookup on the hot path of the step loop.
    /// Both indices must refer to registered layers.
    pub(crate) fn interaction_by_index(&self, a: usize, b: usize) -> bool {
        match &self.layers[a] {
            Some(layer) => layer.interactions[b],
            None => false,
        }
    }

    pub(crate) fn resolve(&self, layer: LayerRef<'_>) -> Result<usize, LayerError> {
        match layer {
            LayerRef::Index(index) => {
                if index >= MAX_LAYERS {
                    return Err(LayerError::IndexOutOfRange(index));
                }
                if self.layers[index].is_some() {
                    Ok(index)
                } else {
                    Err(LayerError::UndefinedIndex(index))
                }
            }
            LayerRef::Name(name) => self
                .layers
                .iter()
                .position(|l| l.as_ref().is_some_and(|l| l.name == name))
                .ok_or_else(|| LayerError::UndefinedName(name.to_string())),
        }
    }
}
