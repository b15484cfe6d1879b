#![deny(missing_docs)]

//! # Replacement Fragments
//!
//! Literal YAML fragments installed into the upstream HSDS document, plus the
//! table describing where each one lands. The upstream document omits the
//! schema definitions for hrefs, shapes, types, layouts and attributes, and
//! leaves the response bodies of the dataset and attribute endpoints empty.
//! Each fragment below is a complete, independently parseable node.

/// Describes a single named-key insertion or overwrite in the document tree.
pub struct Patch {
    /// Key path of the node to install, starting at the document root.
    pub target: &'static [&'static str],
    /// YAML text of the replacement node.
    pub fragment: &'static str,
    /// Whether missing intermediate mappings may be created on the way down.
    ///
    /// Component containers (`components.schemas`) are created when absent;
    /// for path-level targets a missing parent means the upstream document
    /// has drifted and the patch must fail instead.
    pub create_missing_parents: bool,
}

/// A href.
pub const HREF_TYPE: &str = "\
type: object
description: A href.
properties:
  href:
    description: URL of the resource.
    type: string
  rel:
    description: Relation to this object.
    type: string
";

/// A dataspace shape.
pub const SHAPE_TYPE: &str = "\
type: object
description: A shape.
properties:
  class:
    description: The shape class.
    type: string
  dims:
    description: The shape dimensions.
    type: array
    items:
      type: integer
  maxdims:
    description: The shape maximum dimensions.
    type: array
    items:
      type: number
";

/// A field of a compound type.
pub const TYPE_FIELDS_TYPE: &str = "\
type: object
description: A field in a compound dataset.
properties:
  name:
    description: The field name.
    type: string
  type:
    $ref: '#/components/schemas/TypeType'
";

/// A datatype.
pub const TYPE_TYPE: &str = "\
type: object
description: A type.
properties:
  class:
    description: The type class.
    type: string
  base:
    description: The base type class.
    type: string
  fields:
    description: List of fields in a compound dataset.
    type: array
    items:
      $ref: '#/components/schemas/TypeTypeFieldsType'
";

/// A chunk layout.
pub const LAYOUT_TYPE: &str = "\
type: object
description: A layout.
properties:
  class:
    description: The layout class.
    type: string
  dims:
    description: The chunk dimensions.
    type: array
    items:
      type: integer
";

/// An attribute, including its shape and type.
pub const ATTRIBUTE_TYPE: &str = "\
type: object
description: An attribute.
properties:
  created:
    description: The creation date.
    type: number
  lastModified:
    description: The date of last modification.
    type: number
  name:
    description: The name.
    type: string
  shape:
    $ref: '#/components/schemas/ShapeType'
  type:
    $ref: '#/components/schemas/TypeType'
  value:
    description: The values.
  href:
    description: Link to the attribute.
    type: string
  hrefs:
    description: A collection of relations.
    type: array
    items:
      $ref: '#/components/schemas/HrefType'
";

/// Corrected `200` response of `GET /datasets/{id}`.
pub const DATASET_RESPONSE: &str = "\
description: The dataset metadata.
content:
  application/json:
    schema:
      type: object
      properties:
        id:
          description: UUID of this Dataset.
          type: string
        root:
          description: UUID of root Group in Domain.
          type: string
        domain:
          description: The domain name.
          type: string
        created:
          description: The creation date.
          type: number
        lastModified:
          description: The date of the last modification.
          type: number
        attributeCount:
          description: The number of attributes.
          type: number
        type:
          $ref: '#/components/schemas/TypeType'
        shape:
          $ref: '#/components/schemas/ShapeType'
        layout:
          $ref: '#/components/schemas/LayoutType'
        creationProperties:
          description: Dataset creation properties as provided upon creation.
          type: object
        hrefs:
          description: A collection of relations.
          type: array
          items:
            $ref: '#/components/schemas/HrefType'
";

/// Corrected `200` response of `GET /{collection}/{obj_uuid}/attributes/{attr}`.
pub const ATTRIBUTE_RESPONSE: &str = "\
description: The attribute.
content:
  application/json:
    schema:
      $ref: '#/components/schemas/AttributeType'
";

/// Corrected `200` response of `GET /{collection}/{obj_uuid}/attributes`.
pub const ATTRIBUTES_RESPONSE: &str = "\
description: A list of attributes.
content:
  application/json:
    schema:
      type: object
      properties:
        attributes:
          type: array
          items:
            $ref: '#/components/schemas/AttributeType'
        hrefs:
          description: A collection of relations.
          type: array
          items:
            $ref: '#/components/schemas/HrefType'
";

/// The full set of patches, applied in order.
pub const PATCHES: &[Patch] = &[
    Patch {
        target: &["components", "schemas", "HrefType"],
        fragment: HREF_TYPE,
        create_missing_parents: true,
    },
    Patch {
        target: &["components", "schemas", "ShapeType"],
        fragment: SHAPE_TYPE,
        create_missing_parents: true,
    },
    Patch {
        target: &["components", "schemas", "TypeTypeFieldsType"],
        fragment: TYPE_FIELDS_TYPE,
        create_missing_parents: true,
    },
    Patch {
        target: &["components", "schemas", "TypeType"],
        fragment: TYPE_TYPE,
        create_missing_parents: true,
    },
    Patch {
        target: &["components", "schemas", "LayoutType"],
        fragment: LAYOUT_TYPE,
        create_missing_parents: true,
    },
    Patch {
        target: &["components", "schemas", "AttributeType"],
        fragment: ATTRIBUTE_TYPE,
        create_missing_parents: true,
    },
    Patch {
        target: &["paths", "/datasets/{id}", "get", "responses", "200"],
        fragment: DATASET_RESPONSE,
        create_missing_parents: false,
    },
    Patch {
        target: &[
            "paths",
            "/{collection}/{obj_uuid}/attributes/{attr}",
            "get",
            "responses",
            "200",
        ],
        fragment: ATTRIBUTE_RESPONSE,
        create_missing_parents: false,
    },
    Patch {
        target: &[
            "paths",
            "/{collection}/{obj_uuid}/attributes",
            "get",
            "responses",
            "200",
        ],
        fragment: ATTRIBUTES_RESPONSE,
        create_missing_parents: false,
    },
];
