use std::borrow::Cow;

use naga::valid::{Capabilities, ValidationFlags, Validator};

use crate::dispatch::{CLEAR_GROUP_SIZE, RASTERIZE_GROUP_SIZE, VERTEX_GROUP_SIZE};
use crate::error::RasterError;

use super::KernelKind;
use super::interface::{classify, expected_resource};

/// WGSL source of the kernel program bundled with the engine.
pub const BUILTIN_SOURCE: &str = include_str!("../shaders/rasterize.wgsl");

/// Entry point names looked up in the kernel program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelNames {
    pub clear: String,
    pub vertex_transform: String,
    pub rasterize: String,
}

impl Default for KernelNames {
    fn default() -> Self {
        Self {
            clear: "clear_screen".into(),
            vertex_transform: "vertex_transform".into(),
            rasterize: "rasterize_triangles".into(),
        }
    }
}

impl KernelNames {
    fn get(&self, kind: KernelKind) -> &str {
        match kind {
            KernelKind::Clear => &self.clear,
            KernelKind::VertexTransform => &self.vertex_transform,
            KernelKind::Rasterize => &self.rasterize,
        }
    }
}

/// A resolved compute entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelEntry {
    pub name: String,
    pub workgroup_size: [u32; 3],
}

/// The three resolved entry points. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelTable {
    clear: KernelEntry,
    vertex_transform: KernelEntry,
    rasterize: KernelEntry,
}

impl KernelTable {
    pub fn get(&self, kind: KernelKind) -> &KernelEntry {
        match kind {
            KernelKind::Clear => &self.clear,
            KernelKind::VertexTransform => &self.vertex_transform,
            KernelKind::Rasterize => &self.rasterize,
        }
    }
}

/// WGSL kernel program with its entry points resolved.
#[derive(Debug, Clone)]
pub struct KernelProgram {
    label: String,
    source: Cow<'static, str>,
    table: KernelTable,
}

impl KernelProgram {
    /// Loads the bundled kernel program with the default entry point names.
    pub fn builtin() -> Result<Self, RasterError> {
        Self::from_wgsl("rastra kernels", BUILTIN_SOURCE, &KernelNames::default())
    }

    /// Parses `source` and resolves the entry points named in `names`.
    ///
    /// Fails with [`RasterError::KernelResolution`] if the source does not
    /// parse or validate, an entry point is missing or not a compute stage, its
    /// workgroup size differs from the one the dispatch scheduler assumes, or
    /// it uses a binding the backend does not provide for that kernel.
    pub fn from_wgsl(
        label: impl Into<String>,
        source: impl Into<Cow<'static, str>>,
        names: &KernelNames,
    ) -> Result<Self, RasterError> {
        let label = label.into();
        let source = source.into();

        let module = naga::front::wgsl::parse_str(&source).map_err(|e| {
            RasterError::kernel(label.clone(), e.emit_to_string(&source))
        })?;

        let info = Validator::new(ValidationFlags::all(), Capabilities::default())
            .validate(&module)
            .map_err(|e| RasterError::kernel(label.clone(), e.emit_to_string(&source)))?;

        let resolve = |kind: KernelKind| -> Result<KernelEntry, RasterError> {
            let name = names.get(kind);
            let (index, ep) = module
                .entry_points
                .iter()
                .enumerate()
                .find(|(_, ep)| ep.name == name)
                .ok_or_else(|| RasterError::kernel(name, format!("not found in `{label}`")))?;

            if ep.stage != naga::ShaderStage::Compute {
                return Err(RasterError::kernel(
                    name,
                    format!("is a {:?} entry point, expected compute", ep.stage),
                ));
            }

            let expected = expected_group_size(kind);
            if ep.workgroup_size != expected {
                return Err(RasterError::kernel(
                    name,
                    format!(
                        "workgroup size {:?} does not match the {:?} the {} dispatch is sized for",
                        ep.workgroup_size,
                        expected,
                        kind.label(),
                    ),
                ));
            }

            let uses = info.get_entry_point(index);
            for (handle, var) in module.global_variables.iter() {
                let Some(binding) = var.binding.as_ref() else { continue };
                if uses[handle].is_empty() {
                    continue;
                }

                let provided = expected_resource(kind, binding.group, binding.binding);
                let declared = classify(&module, var);
                if provided.is_none() || provided != declared {
                    return Err(RasterError::kernel(
                        name,
                        format!(
                            "@group({}) @binding({}) `{}` is declared as {declared:?}, the {} kernel is given {provided:?}",
                            binding.group,
                            binding.binding,
                            var.name.as_deref().unwrap_or("_"),
                            kind.label(),
                        ),
                    ));
                }
            }

            Ok(KernelEntry { name: name.to_owned(), workgroup_size: ep.workgroup_size })
        };

        let table = KernelTable {
            clear: resolve(KernelKind::Clear)?,
            vertex_transform: resolve(KernelKind::VertexTransform)?,
            rasterize: resolve(KernelKind::Rasterize)?,
        };

        log::debug!(
            "resolved kernels in `{label}`: {}, {}, {}",
            table.clear.name,
            table.vertex_transform.name,
            table.rasterize.name,
        );

        Ok(Self { label, source, table })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn entry(&self, kind: KernelKind) -> &KernelEntry {
        self.table.get(kind)
    }
}

fn expected_group_size(kind: KernelKind) -> [u32; 3] {
    match kind {
        KernelKind::Clear => CLEAR_GROUP_SIZE,
        KernelKind::VertexTransform => VERTEX_GROUP_SIZE,
        KernelKind::Rasterize => RASTERIZE_GROUP_SIZE,
    }
}
