//! Static catalog data embedded in the layout prompt.
//!
//! The example trees steer the model towards the exact wire shape of
//! [`crate::model::LayoutNode`]. They are configuration, not logic: each
//! rendered string is built once per process and shared by every prompt.

use crate::model::{ContentType, LayoutType};
use once_cell::sync::Lazy;

/// Small trees, one per common layout, showing the minimal valid shape.
const MINIMAL_EXAMPLES: &str = r#"[
  {
    "id": "9a1c2f4e-5b7d-4c1a-8e2f-3d4b5a6c7e8f",
    "slideName": "Blank card",
    "type": "blank-card",
    "className": "p-8 mx-auto flex justify-center items-center min-h-[200px]",
    "content": {
      "id": "1f2e3d4c-5b6a-4798-8a9b-0c1d2e3f4a5b",
      "type": "column",
      "name": "Column",
      "content": [
        {
          "id": "2a3b4c5d-6e7f-4809-9a1b-2c3d4e5f6a7b",
          "type": "title",
          "name": "Title",
          "content": "",
          "placeholder": "Untitled Card"
        }
      ]
    }
  },
  {
    "id": "3b4c5d6e-7f80-4912-8a2b-3c4d5e6f7a8b",
    "slideName": "Accent left",
    "type": "accentLeft",
    "className": "min-h-[300px]",
    "content": {
      "id": "4c5d6e7f-8091-4a23-9b3c-4d5e6f7a8b9c",
      "type": "column",
      "name": "Column",
      "restrictDropTo": true,
      "content": [
        {
          "id": "5d6e7f80-91a2-4b34-8c4d-5e6f7a8b9c0d",
          "type": "resizable-column",
          "name": "Resizable column",
          "restrictToDrop": true,
          "content": [
            {
              "id": "6e7f8091-a2b3-4c45-9d5e-6f7a8b9c0d1e",
              "type": "image",
              "name": "Image",
              "content": "https://plus.unsplash.com/premium_photo-1729004379397-ece899804701",
              "alt": "Sunlit office desk with an open laptop and a notebook"
            },
            {
              "id": "7f8091a2-b3c4-4d56-8e6f-7a8b9c0d1e2f",
              "type": "column",
              "name": "Column",
              "content": [
                {
                  "id": "8091a2b3-c4d5-4e67-9f7a-8b9c0d1e2f3a",
                  "type": "heading1",
                  "name": "Heading1",
                  "content": "",
                  "placeholder": "Heading1"
                },
                {
                  "id": "91a2b3c4-d5e6-4f78-8a8b-9c0d1e2f3a4b",
                  "type": "paragraph",
                  "name": "Paragraph",
                  "content": "",
                  "placeholder": "start typing here"
                }
              ],
              "className": "w-full h-full p-8 flex justify-center items-center",
              "placeholder": "Heading1"
            }
          ]
        }
      ]
    }
  }
]"#;

/// A complete slide with headings, text and two images.
const FULL_EXAMPLE: &str = r#"{
  "id": "a2b3c4d5-e6f7-4089-9b9c-0d1e2f3a4b5c",
  "slideName": "Two image columns",
  "type": "twoImageColumns",
  "className": "p-4 mx-auto flex justify-center items-center",
  "content": {
    "id": "b3c4d5e6-f708-4190-8cad-1e2f3a4b5c6d",
    "type": "column",
    "name": "Column",
    "content": [
      {
        "id": "c4d5e6f7-0819-4201-9dbe-2f3a4b5c6d7e",
        "type": "title",
        "name": "Title",
        "content": "Renewable Energy at Home",
        "placeholder": "Untitled Card"
      },
      {
        "id": "d5e6f708-192a-4312-8ecf-3a4b5c6d7e8f",
        "type": "resizable-column",
        "name": "Image columns",
        "className": "border-none",
        "content": [
          {
            "id": "e6f70819-2a3b-4423-9fd0-4b5c6d7e8f90",
            "type": "column",
            "name": "Column",
            "content": [
              {
                "id": "f708192a-3b4c-4534-8ae1-5c6d7e8f9001",
                "type": "image",
                "name": "Image",
                "className": "p-3",
                "content": "https://plus.unsplash.com/premium_photo-1729004379397-ece899804701",
                "alt": "Rooftop solar panels on a suburban house under a clear blue sky"
              },
              {
                "id": "08192a3b-4c5d-4645-9bf2-6d7e8f900112",
                "type": "heading3",
                "name": "Heading3",
                "content": "Solar panels",
                "placeholder": "Heading 3"
              },
              {
                "id": "192a3b4c-5d6e-4756-8c03-7e8f90011223",
                "type": "paragraph",
                "name": "Paragraph",
                "content": "Panels on a south-facing roof can cover most of a household's daytime demand.",
                "placeholder": "Start typing..."
              }
            ]
          },
          {
            "id": "2a3b4c5d-6e7f-4867-9d14-8f9001122334",
            "type": "column",
            "name": "Column",
            "content": [
              {
                "id": "3b4c5d6e-7f80-4978-8e25-900112233445",
                "type": "image",
                "name": "Image",
                "className": "p-3",
                "content": "https://plus.unsplash.com/premium_photo-1729004379397-ece899804701",
                "alt": "Wall-mounted home battery unit in a tidy garage"
              },
              {
                "id": "4c5d6e7f-8091-4a89-9f36-a01122334456",
                "type": "heading3",
                "name": "Heading3",
                "content": "Home batteries",
                "placeholder": "Heading 3"
              },
              {
                "id": "5d6e7f80-91a2-4b9a-8a47-b11223344567",
                "type": "bulletList",
                "name": "Bullet list",
                "content": "Store surplus daytime power\nRun essentials during outages\nShift usage away from peak tariffs"
              }
            ]
          }
        ]
      },
      {
        "id": "6e7f8091-a2b3-4cab-9b58-c22334455678",
        "type": "divider",
        "name": "Divider",
        "content": ""
      },
      {
        "id": "7f8091a2-b3c4-4dbc-8c69-d33445566789",
        "type": "calloutBox",
        "name": "Callout",
        "content": "Most installations pay for themselves within ten years."
      }
    ]
  }
}"#;

/// Comma-separated list of layout type wire names.
pub static LAYOUT_TYPE_LIST: Lazy<String> = Lazy::new(|| {
    LayoutType::ALL
        .iter()
        .map(|t| format!("\"{}\"", t.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
});

/// Comma-separated list of content type wire names.
pub static CONTENT_TYPE_LIST: Lazy<String> = Lazy::new(|| {
    ContentType::ALL
        .iter()
        .map(|t| format!("\"{}\"", t.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
});

/// Minimal example trees as embedded in the prompt.
pub fn minimal_examples() -> &'static str {
    MINIMAL_EXAMPLES
}

/// The fuller example tree as embedded in the prompt.
pub fn full_example() -> &'static str {
    FULL_EXAMPLE
}
