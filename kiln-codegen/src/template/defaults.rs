//! Built-in templates.

use super::{LayoutConfig, Template};

pub const DEFAULT_MODEL_DIR: &str = "biz/model";

/// Name of the built-in model template.
pub const MODEL_TEMPLATE: &str = "model.go";

const GO_MOD: &str = "module {{ GoModule }}\n\ngo 1.21\n";

const GITIGNORE: &str = r#"*.o
*.a
*.so
_obj
_test
*.[568vq]
[568vq].out
*.cgo1.go
*.cgo2.c
_cgo_defun.c
_cgo_gotypes.go
_cgo_export.*
_testmain.go
*.exe
*.exe~
*.test
*.prof
*.rar
*.zip
*.gz
*.psd
*.bmd
*.cfg
*.pptx
*.log
*nohup.out
*settings.pyc
*.sublime-project
*.sublime-workspace
!.gitkeep
.DS_Store
/.idea
/.vscode
/output
*.local.yml
"#;

const BUILD_SH: &str = r#"#!/bin/bash
RUN_NAME={{ ServiceName }}
mkdir -p output/bin
cp script/* output 2>/dev/null
chmod +x output/bootstrap.sh
go build -o output/bin/${RUN_NAME}
"#;

const BOOTSTRAP_SH: &str = r#"#!/bin/bash
CURDIR=$(cd $(dirname $0); pwd)
BinaryName={{ ServiceName }}
echo "$CURDIR/bin/${BinaryName}"
exec $CURDIR/bin/${BinaryName}
"#;

const MODEL_GO: &str = r#"// Code generated by kiln. DO NOT EDIT.

package {{ PackageName }}
{%- if StdImports or Imports %}

import (
{%- for path in StdImports %}
	"{{ path }}"
{%- endfor %}
{%- for imp in Imports %}
	{{ imp.Alias }} "{{ imp.Path }}"
{%- endfor %}
)
{%- endif %}
{%- for e in Enums %}

type {{ e.Name }} {% if Options.TypedefAsTypeAlias %}= {% endif %}int32

const (
{%- for v in e.Values %}
	{{ v.Name }} {{ e.Name }} = {{ v.Number }}
{%- endfor %}
)
{%- if not Options.TypedefAsTypeAlias %}

func (p {{ e.Name }}) String() string {
	switch p {
{%- for v in e.Values %}
	case {{ v.Name }}:
		return "{{ v.Raw }}"
{%- endfor %}
	}
	return fmt.Sprintf("{{ e.Name }}(%d)", int32(p))
}
{%- if Options.MarshalEnumToText %}

func (p {{ e.Name }}) MarshalText() ([]byte, error) {
	return []byte(p.String()), nil
}

func (p *{{ e.Name }}) UnmarshalText(text []byte) error {
	switch string(text) {
{%- for v in e.Values %}
	case "{{ v.Raw }}":
		*p = {{ v.Name }}
		return nil
{%- endfor %}
	}
	return fmt.Errorf("invalid {{ e.Name }} %q", string(text))
}
{%- endif %}
{%- endif %}
{%- endfor %}
{%- for s in Structs %}

type {{ s.Name }} struct {
{%- for f in s.Fields %}
	{{ f.Name }} {{ f.GoType }}{% if f.Tag %} `{{ f.Tag }}`{% endif %}
{%- endfor %}
}
{%- endfor %}
{%- for o in Oneofs %}

type {{ o.Interface }} interface {
	{{ o.Interface }}()
}
{%- for c in o.Choices %}

type {{ c.Wrapper }} struct {
	{{ c.Name }} {{ c.GoType }}{% if c.Tag %} `{{ c.Tag }}`{% endif %}
}

func (*{{ c.Wrapper }}) {{ o.Interface }}() {}
{%- endfor %}
{%- endfor %}
"#;

fn builtin(path: impl Into<String>, body: &str) -> Template {
    Template {
        default: true,
        ..Template::new(path, body)
    }
}

/// Project skeleton: model directory, `go.mod`, `.gitignore` and build scripts.
pub fn default_layout(model_dir: &str) -> LayoutConfig {
    let model_dir = model_dir.trim_end_matches('/');
    let model_dir = if model_dir.is_empty() {
        DEFAULT_MODEL_DIR
    } else {
        model_dir
    };

    LayoutConfig {
        layouts: vec![
            builtin(format!("{model_dir}/"), ""),
            builtin("go.mod", GO_MOD),
            builtin(".gitignore", GITIGNORE),
            builtin("build.sh", BUILD_SH),
            builtin("script/bootstrap.sh", BOOTSTRAP_SH),
        ],
    }
}

/// Templates every package generation starts from.
pub fn default_package_templates() -> LayoutConfig {
    LayoutConfig {
        layouts: vec![builtin(MODEL_TEMPLATE, MODEL_GO)],
    }
}

/// `base` with the templates of `custom` added, replacing built-ins that
/// share a path.
pub fn merge_templates(base: LayoutConfig, custom: LayoutConfig) -> LayoutConfig {
    let mut layouts: Vec<Template> = base
        .layouts
        .into_iter()
        .filter(|b| !custom.layouts.iter().any(|c| c.path == b.path))
        .collect();
    layouts.extend(custom.layouts);
    LayoutConfig { layouts }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_paths() {
        let layout = default_layout("");
        let paths: Vec<_> = layout.layouts.iter().map(|t| t.path.as_str()).collect();

        assert_eq!(
            paths,
            ["biz/model/", "go.mod", ".gitignore", "build.sh", "script/bootstrap.sh"]
        );
        assert!(layout.layouts.iter().all(|t| t.default));
    }

    #[test]
    fn test_custom_model_dir() {
        let layout = default_layout("internal/model/");
        assert_eq!(layout.layouts[0].path, "internal/model/");
    }

    #[test]
    fn test_merge_replaces_builtin_with_same_path() {
        let mut disabled = Template::new(MODEL_TEMPLATE, "");
        disabled.disable = true;
        let custom = LayoutConfig {
            layouts: vec![disabled, Template::new("biz/handler.go", "package handler")],
        };

        let merged = merge_templates(default_package_templates(), custom);

        assert_eq!(merged.layouts.len(), 2);
        assert!(merged.layouts[0].disable);
        assert_eq!(merged.layouts[1].path, "biz/handler.go");
    }
}
